use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::env;

use finger_snake::config::{GameConfig, CONFIG_PATH};
use finger_snake::constants::{GAME_HEIGHT, GAME_WIDTH};
use finger_snake::graphics;
use finger_snake::menu::MenuPlugin;
use finger_snake::rendering::RenderingPlugin;
use finger_snake::simulation::SimulationPlugin;
use finger_snake::tracking::{
    CameraMapping, CursorFeed, CursorSensor, PositionSmoother, SamplerSettings, SamplingLoop,
    ScriptedSensor, SharedTrackingState, SmootherSettings,
};

/// Start the sampling thread with the sensor chosen by `SNAKE_SENSOR`.
///
/// `SNAKE_SENSOR=scripted` replays a built-in path with periodic faults;
/// anything else follows the mouse pointer.
fn spawn_sampler(
    config: &GameConfig,
    shared: &SharedTrackingState,
    feed: &CursorFeed,
) -> Option<SamplingLoop> {
    let settings = SamplerSettings::from(config);
    let mapping = CameraMapping::from(config);
    let smoother = PositionSmoother::new(SmootherSettings::from(config));

    let spawned = match env::var("SNAKE_SENSOR").as_deref() {
        Ok("scripted") => {
            info!("Using scripted sensor");
            let sensor = ScriptedSensor::new(config).with_faults(45, 120, 200);
            SamplingLoop::spawn(sensor, settings, mapping, smoother, shared.clone())
        }
        _ => {
            info!("Using pointer sensor");
            let sensor = CursorSensor::new(feed.clone(), config);
            SamplingLoop::spawn(sensor, settings, mapping, smoother, shared.clone())
        }
    };

    match spawned {
        Ok(sampler) => Some(sampler),
        Err(err) => {
            error!("Could not start sampling thread: {err}");
            None
        }
    }
}

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Finger Snake".into(),
            resolution: WindowResolution::new(GAME_WIDTH as u32, GAME_HEIGHT as u32),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK));

    // Logging is live once DefaultPlugins is built, so load config after it.
    let config = GameConfig::load_or_default(CONFIG_PATH);
    let shared = SharedTrackingState::new();
    let feed = CursorFeed::default();
    let mut sampler = spawn_sampler(&config, &shared, &feed);

    app.insert_resource(config)
        .insert_resource(shared)
        .insert_resource(feed)
        .add_plugins((MenuPlugin, SimulationPlugin, RenderingPlugin))
        .add_systems(
            Startup,
            (graphics::setup_camera, graphics::fit_window_to_playfield),
        );

    app.run();

    if let Some(sampler) = sampler.as_mut() {
        sampler.shutdown_default();
    }
}
