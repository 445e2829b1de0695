//! Bevy wiring of the session: fixed-rate tick, event fan-out, phase sync,
//! high-score persistence, pause input and the pointer feed.
//!
//! ## Systems (registered by `SimulationPlugin`)
//!
//! | System                      | Schedule      | Purpose                                 |
//! |-----------------------------|---------------|-----------------------------------------|
//! | `session_tick_system`       | `FixedUpdate` | One `Session::tick` per simulation tick |
//! | `sync_phase_system`         | `Update`      | Mirror `SessionPhase` into `GamePhase`  |
//! | `log_session_events_system` | `Update`      | Log every `SessionEvent`                |
//! | `persist_high_score_system` | `Update`      | Save `NewHighScore` to disk             |
//! | `pause_input_system`        | `Update`      | `P` / `Space` pause, `Esc` quit         |
//! | `cursor_feed_system`        | `Update`      | Window pointer → `CursorFeed`           |

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::GameConfig;
use crate::menu::GamePhase;
use crate::save::HighScoreStore;
use crate::session::{GameEvent, Session};
use crate::tracking::{CursorFeed, SharedTrackingState};

/// The running game session.
#[derive(Resource, Debug, Clone)]
pub struct ActiveSession(pub Session);

/// One [`GameEvent`] forwarded to renderer, audio and persistence sinks.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SessionEvent(pub GameEvent);

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world_mut()
            .get_resource_or_insert_with(GameConfig::default)
            .clone();
        let store = HighScoreStore::new(&config.high_score_path);
        let session = Session::new(&config, store.load_or_zero());

        app.insert_resource(Time::<Fixed>::from_hz(config.tick_hz))
            .insert_resource(store)
            .insert_resource(ActiveSession(session))
            .init_resource::<SharedTrackingState>()
            .init_resource::<CursorFeed>()
            .add_message::<SessionEvent>()
            .add_systems(FixedUpdate, session_tick_system)
            .add_systems(
                Update,
                (
                    sync_phase_system,
                    log_session_events_system,
                    persist_high_score_system,
                    pause_input_system.run_if(resource_exists::<ButtonInput<KeyCode>>),
                    cursor_feed_system,
                ),
            );
    }
}

/// Run one session tick against the freshest tracking sample.
pub fn session_tick_system(
    shared: Res<SharedTrackingState>,
    time: Res<Time>,
    mut session: ResMut<ActiveSession>,
    mut events: MessageWriter<SessionEvent>,
) {
    let slot = shared.snapshot();
    for event in session.0.tick(slot, time.elapsed_secs()) {
        events.write(SessionEvent(event));
    }
}

pub fn sync_phase_system(
    session: Res<ActiveSession>,
    state: Res<State<GamePhase>>,
    mut next_state: ResMut<NextState<GamePhase>>,
) {
    let phase = GamePhase::from(session.0.phase());
    if *state.get() != phase {
        next_state.set(phase);
    }
}

pub fn log_session_events_system(mut events: MessageReader<SessionEvent>) {
    for SessionEvent(event) in events.read() {
        match event {
            GameEvent::RoundStarted => info!("Round started"),
            GameEvent::GameOver { score, cause } => {
                info!("Game over ({cause:?}) with score {score}")
            }
            GameEvent::NewHighScore { value } => info!("New high score: {value}"),
            GameEvent::Boosted { duration } => debug!("Boost for {duration:.1}s"),
            other => debug!("{other:?}"),
        }
    }
}

/// Write each new high score; failures are logged and otherwise ignored.
pub fn persist_high_score_system(
    mut events: MessageReader<SessionEvent>,
    store: Res<HighScoreStore>,
) {
    for SessionEvent(event) in events.read() {
        if let GameEvent::NewHighScore { value } = event {
            if let Err(err) = store.save(*value) {
                warn!("{err}");
            }
        }
    }
}

pub fn pause_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut session: ResMut<ActiveSession>,
    mut exit: MessageWriter<AppExit>,
) {
    if keys.any_just_pressed([KeyCode::KeyP, KeyCode::Space]) {
        let paused = session.0.toggle_pause();
        info!("{}", if paused { "Paused" } else { "Resumed" });
    }
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}

/// Publish the window pointer into the [`CursorFeed`] in camera pixels.
///
/// The playfield is drawn centred in the window at one pixel per unit, so the
/// pointer is first shifted into playfield space and then scaled to the
/// camera image.  When the camera is mirrored the x axis is flipped here so
/// the mapping back to the playfield lands under the pointer.
pub fn cursor_feed_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    feed: Res<CursorFeed>,
    config: Res<GameConfig>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let game = Vec2::new(config.game_width, config.game_height);
    let camera = Vec2::new(config.camera_width, config.camera_height);

    let point = window.cursor_position().map(|cursor| {
        let offset = (window.size() - game) * 0.5;
        let mut p = (cursor - offset) * camera / game;
        if config.camera_mirror {
            p.x = camera.x - p.x;
        }
        p
    });
    feed.0.put(point);
}
