//! End-to-end tests of the threaded pipeline:
//! sensor → `SamplingLoop` → `SharedTrackingState` → `Session`.
//!
//! The sampling thread runs for real; the simulation side is ticked by the
//! test with a synthetic clock and short sleeps so the thread can publish.

use bevy::math::Vec2;
use finger_snake::config::GameConfig;
use finger_snake::session::{Session, SessionPhase};
use finger_snake::tracking::{
    CameraMapping, CursorFeed, CursorSensor, PositionSmoother, SamplerSettings, SamplingLoop,
    ScriptedSensor, SharedSlot, SharedTrackingState, SmootherSettings,
};
use std::thread;
use std::time::{Duration, Instant};

const DT: f32 = 1.0 / 60.0;

fn fast_settings() -> SamplerSettings {
    SamplerSettings {
        idle: Duration::from_millis(1),
        retry_delay: Duration::from_millis(1),
        shutdown_timeout: Duration::from_secs(2),
    }
}

fn spawn<S: finger_snake::tracking::PositionSensor>(
    sensor: S,
    config: &GameConfig,
    shared: &SharedTrackingState,
) -> SamplingLoop {
    SamplingLoop::spawn(
        sensor,
        fast_settings(),
        CameraMapping::from(config),
        PositionSmoother::new(SmootherSettings::from(config)),
        shared.clone(),
    )
    .expect("spawn sampling thread")
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

/// Glitches, dropouts and failed reads never make the published target jump.
#[test]
fn faulty_sensor_yields_a_steady_target() {
    let config = GameConfig::default();
    let shared = SharedTrackingState::new();
    let sensor = ScriptedSensor::new(&config)
        .with_cadence(Duration::from_millis(1))
        .with_faults(11, 7, 13);
    let mut sampler = spawn(sensor, &config, &shared);

    let mut previous: Option<SharedSlot> = None;
    let mut checked = 0;
    let deadline = Instant::now() + Duration::from_millis(400);
    while Instant::now() < deadline {
        let slot = shared.snapshot();
        if slot.latest.valid {
            let p = slot.latest.point;
            assert!(
                (14.0..=786.0).contains(&p.x) && (14.0..=586.0).contains(&p.y),
                "target {p} left the clamped playfield"
            );
            if let Some(prev) = previous {
                let steps = slot.sequence.wrapping_sub(prev.sequence).max(1) as f32;
                let moved = p.distance(prev.latest.point);
                assert!(
                    moved <= 40.0 * steps,
                    "target jumped {moved:.1}px over {steps} samples"
                );
            }
            previous = Some(slot);
            checked += 1;
        }
        thread::sleep(Duration::from_millis(1));
    }

    assert!(checked > 10, "only {checked} valid samples observed");
    assert!(sampler.shutdown(Duration::from_secs(2)));
}

/// A pointer held still starts a round; moving it steers the head; losing it
/// freezes the chain.
#[test]
fn pointer_drives_a_session() {
    let config = GameConfig {
        sensor_cadence_ms: 1,
        ..GameConfig::default()
    };
    let shared = SharedTrackingState::new();
    let feed = CursorFeed::default();
    let mut sampler = spawn(CursorSensor::new(feed.clone(), &config), &config, &shared);
    let mut session = Session::with_seed(&config, 0, 5);
    let mut now = 0.0;

    // Camera centre maps to the playfield centre.
    feed.0.put(Some(Vec2::new(320.0, 240.0)));
    assert!(wait_until(Duration::from_secs(2), || shared.read().1));

    let started = wait_until(Duration::from_secs(3), || {
        session.tick(shared.snapshot(), now);
        now += DT;
        session.phase() == SessionPhase::Playing
    });
    assert!(started, "round never started");

    // Far to the right: the smoother first rejects the jump, then relocates.
    feed.0.put(Some(Vec2::new(560.0, 240.0)));
    let steered = wait_until(Duration::from_secs(5), || {
        session.tick(shared.snapshot(), now);
        now += DT;
        session.chain().head().x > 650.0
    });
    assert!(steered, "head stuck at {}", session.chain().head());
    assert_eq!(session.phase(), SessionPhase::Playing);

    feed.0.put(None);
    assert!(wait_until(Duration::from_secs(2), || !shared.read().1));
    session.tick(shared.snapshot(), now);
    let frozen: Vec<_> = session.chain().points().collect();
    for _ in 0..20 {
        now += DT;
        session.tick(shared.snapshot(), now);
    }
    assert_eq!(session.chain().points().collect::<Vec<_>>(), frozen);

    assert!(sampler.shutdown(Duration::from_secs(2)));
}
