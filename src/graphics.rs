use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::GameConfig;

/// Setup camera for 2D rendering.
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d maps one world unit to one logical pixel, centred.
    commands.spawn(Camera2d);
    info!("Camera spawned");
}

/// Size the primary window to the configured playfield.
pub fn fit_window_to_playfield(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    config: Res<GameConfig>,
) {
    for mut window in windows.iter_mut() {
        window.resolution.set(config.game_width, config.game_height);
    }
}
