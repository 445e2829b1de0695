//! Menu and game-over overlays: `GamePhase` definition and `MenuPlugin`.
//!
//! ## States
//!
//! | State      | Description                                          |
//! |------------|------------------------------------------------------|
//! | `Menu`     | Initial state; title overlay, waiting for a steady hand |
//! | `Playing`  | Round in progress; overlays hidden                   |
//! | `GameOver` | Final score overlay, waiting for a steady hand       |
//!
//! `GamePhase` mirrors [`SessionPhase`]; the session decides transitions and
//! [`crate::simulation::sync_phase_system`] copies them into the Bevy state.
//!
//! ## Systems (registered by `MenuPlugin`)
//!
//! | System                    | Schedule                  | Purpose                       |
//! |---------------------------|---------------------------|-------------------------------|
//! | `setup_menu_overlay`      | `OnEnter(Menu)`           | Spawn title overlay           |
//! | `setup_game_over_overlay` | `OnEnter(GameOver)`       | Spawn final-score overlay     |
//! | `cleanup_overlay`         | `OnExit(Menu / GameOver)` | Despawn overlay entities      |
//! | `dwell_text_system`       | `Update / not Playing`    | Refresh the hold-steady bar   |

use bevy::prelude::*;

use crate::simulation::ActiveSession;
use crate::session::SessionPhase;

// ── Game phase ────────────────────────────────────────────────────────────────

/// Top-level application state.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GamePhase {
    /// Title overlay; shown on startup.
    #[default]
    Menu,
    /// Round in progress.
    Playing,
    /// Round over; final score overlay shown until the next dwell completes.
    GameOver,
}

impl From<SessionPhase> for GamePhase {
    fn from(phase: SessionPhase) -> Self {
        match phase {
            SessionPhase::Menu => Self::Menu,
            SessionPhase::Playing => Self::Playing,
            SessionPhase::GameOver => Self::GameOver,
        }
    }
}

// ── Component markers ─────────────────────────────────────────────────────────

/// Root node of the menu and game-over overlays; despawned on exit.
#[derive(Component)]
pub struct OverlayRoot;

/// Text node showing dwell progress.
#[derive(Component)]
pub struct DwellText;

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GamePhase` and the overlay setup/teardown.
///
/// Add before [`crate::simulation::SimulationPlugin`] so the state exists when
/// the phase sync system first runs.
pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GamePhase>()
            .add_systems(OnEnter(GamePhase::Menu), setup_menu_overlay)
            .add_systems(OnExit(GamePhase::Menu), cleanup_overlay)
            .add_systems(OnEnter(GamePhase::GameOver), setup_game_over_overlay)
            .add_systems(OnExit(GamePhase::GameOver), cleanup_overlay)
            .add_systems(
                Update,
                dwell_text_system.run_if(not(in_state(GamePhase::Playing))),
            );
    }
}

// ── Colour helpers ────────────────────────────────────────────────────────────

fn title_color() -> Color {
    Color::srgb(0.45, 0.95, 0.55)
}
fn game_over_color() -> Color {
    Color::srgb(1.0, 0.22, 0.22)
}
fn subtitle_color() -> Color {
    Color::srgb(0.55, 0.55, 0.65)
}
fn dwell_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}

// ── OnEnter: spawn overlays ───────────────────────────────────────────────────

/// Spawn the title overlay.
///
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │               FINGER SNAKE                  │
/// │   Hold your finger steady in view to start  │
/// │              [■■■■□□□□□□]                   │
/// └─────────────────────────────────────────────┘
/// ```
pub fn setup_menu_overlay(mut commands: Commands) {
    spawn_overlay(&mut commands, |card| {
        card.spawn((
            Text::new("FINGER SNAKE"),
            TextFont {
                font_size: 56.0,
                ..default()
            },
            TextColor(title_color()),
        ));
        card.spawn((
            Text::new("Hold your finger steady in view to start"),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(subtitle_color()),
        ));
    });
}

/// Spawn the final-score overlay.
pub fn setup_game_over_overlay(mut commands: Commands, session: Res<ActiveSession>) {
    let score = session.0.score();
    let high = session.0.high_score();
    spawn_overlay(&mut commands, |card| {
        card.spawn((
            Text::new("GAME OVER"),
            TextFont {
                font_size: 46.0,
                ..default()
            },
            TextColor(game_over_color()),
        ));
        card.spawn((
            Text::new(format!("Score: {score}   High: {high}")),
            TextFont {
                font_size: 20.0,
                ..default()
            },
            TextColor(subtitle_color()),
        ));
        card.spawn((
            Text::new("Hold steady to play again"),
            TextFont {
                font_size: 16.0,
                ..default()
            },
            TextColor(subtitle_color()),
        ));
    });
}

/// Centred translucent card with caller-provided lines and a dwell bar.
fn spawn_overlay(commands: &mut Commands, lines: impl FnOnce(&mut ChildSpawnerCommands<'_>)) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                top: Val::Px(0.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            ZIndex(300),
            OverlayRoot,
        ))
        .with_children(|overlay| {
            overlay
                .spawn(Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    padding: UiRect::all(Val::Px(40.0)),
                    row_gap: Val::Px(16.0),
                    ..default()
                })
                .with_children(|card| {
                    lines(card);
                    card.spawn((
                        Text::new(dwell_bar(0.0)),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(dwell_color()),
                        DwellText,
                    ));
                });
        });
}

// ── OnExit: despawn overlays ──────────────────────────────────────────────────

pub fn cleanup_overlay(mut commands: Commands, query: Query<Entity, With<OverlayRoot>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn();
    }
}

// ── Update: dwell bar ─────────────────────────────────────────────────────────

pub fn dwell_text_system(
    session: Res<ActiveSession>,
    time: Res<Time<Fixed>>,
    mut query: Query<&mut Text, With<DwellText>>,
) {
    let bar = dwell_bar(session.0.dwell_progress(time.elapsed_secs()));
    for mut text in query.iter_mut() {
        if text.0 != bar {
            text.0 = bar.clone();
        }
    }
}

/// Ten-cell progress bar, e.g. `[■■■■□□□□□□]`.
pub fn dwell_bar(progress: f32) -> String {
    let filled = (progress.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("[{}{}]", "■".repeat(filled), "□".repeat(10 - filled))
}
