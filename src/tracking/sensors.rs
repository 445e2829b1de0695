//! Stand-in sensor collaborators.
//!
//! The real detector (camera + hand landmark model) lives outside this crate;
//! all the core needs is something that yields a camera-space point and a
//! found flag at its own cadence.  These two sources drive the demo binary
//! and the threaded tests.

use super::sampler::{PositionSensor, SensorReading};
use super::shared::CursorFeed;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult};
use crate::Point;
use bevy::prelude::*;
use std::f32::consts::TAU;
use std::thread;
use std::time::Duration;

/// Deterministic Lissajous path through camera space.
///
/// Optional periodic faults exercise the smoother and sampler:
/// every `dropout_every`-th reading reports the point as lost, every
/// `glitch_every`-th reading jumps to the opposite corner, and every
/// `fail_every`-th call produces no frame at all.
#[derive(Debug, Clone)]
pub struct ScriptedSensor {
    camera_size: Vec2,
    cadence: Duration,
    /// Radians of path phase advanced per reading.
    step: f32,
    frame: u32,
    pub dropout_every: Option<u32>,
    pub glitch_every: Option<u32>,
    pub fail_every: Option<u32>,
}

impl ScriptedSensor {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            camera_size: Vec2::new(config.camera_width, config.camera_height),
            cadence: Duration::from_millis(config.sensor_cadence_ms),
            step: 0.01,
            frame: 0,
            dropout_every: None,
            glitch_every: None,
            fail_every: None,
        }
    }

    /// Inject faults: lost point, far glitch, and missing frame periods.
    pub fn with_faults(mut self, dropout: u32, glitch: u32, fail: u32) -> Self {
        self.dropout_every = (dropout > 0).then_some(dropout);
        self.glitch_every = (glitch > 0).then_some(glitch);
        self.fail_every = (fail > 0).then_some(fail);
        self
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Path position for a given frame index, in camera pixels.
    pub fn path_point(&self, frame: u32) -> Point {
        let t = frame as f32 * self.step;
        let center = self.camera_size * 0.5;
        let amplitude = self.camera_size * Vec2::new(0.32, 0.28);
        center + amplitude * Vec2::new(t.sin(), (t * 2.0 + TAU / 8.0).sin())
    }

    fn hits(period: Option<u32>, frame: u32) -> bool {
        period.is_some_and(|p| frame % p == p - 1)
    }
}

impl PositionSensor for ScriptedSensor {
    fn sample(&mut self) -> GameResult<SensorReading> {
        if !self.cadence.is_zero() {
            thread::sleep(self.cadence);
        }
        let frame = self.frame;
        self.frame = self.frame.wrapping_add(1);

        if Self::hits(self.fail_every, frame) {
            return Err(GameError::SensorRead {
                reason: format!("scripted frame {frame} dropped"),
            });
        }
        if Self::hits(self.dropout_every, frame) {
            return Ok(SensorReading::lost());
        }
        if Self::hits(self.glitch_every, frame) {
            let p = self.path_point(frame);
            return Ok(SensorReading::found(self.camera_size - p));
        }
        Ok(SensorReading::found(self.path_point(frame)))
    }
}

/// Samples the window pointer, published into a [`CursorFeed`] by the app,
/// at a camera-like cadence.
#[derive(Debug, Clone)]
pub struct CursorSensor {
    feed: CursorFeed,
    cadence: Duration,
}

impl CursorSensor {
    pub fn new(feed: CursorFeed, config: &GameConfig) -> Self {
        Self {
            feed,
            cadence: Duration::from_millis(config.sensor_cadence_ms),
        }
    }
}

impl PositionSensor for CursorSensor {
    fn sample(&mut self) -> GameResult<SensorReading> {
        thread::sleep(self.cadence);
        Ok(match self.feed.0.get() {
            Some(point) => SensorReading::found(point),
            None => SensorReading::lost(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_sensor() -> ScriptedSensor {
        ScriptedSensor::new(&GameConfig::default()).with_cadence(Duration::ZERO)
    }

    #[test]
    fn path_stays_inside_the_camera_image() {
        let sensor = instant_sensor();
        for frame in 0..2_000 {
            let p = sensor.path_point(frame);
            assert!(p.x > 0.0 && p.x < 640.0, "frame {frame}: {p}");
            assert!(p.y > 0.0 && p.y < 480.0, "frame {frame}: {p}");
        }
    }

    #[test]
    fn consecutive_path_points_are_close() {
        let sensor = instant_sensor();
        for frame in 0..500 {
            let jump = sensor.path_point(frame).distance(sensor.path_point(frame + 1));
            assert!(jump < 10.0, "frame {frame} jumped {jump}");
        }
    }

    #[test]
    fn faults_fire_on_their_periods() {
        let mut sensor = instant_sensor().with_faults(3, 0, 5);
        let results: Vec<_> = (0..10).map(|_| sensor.sample()).collect();
        // fail on frames 4 and 9, lost on frames 2 and 5 and 8
        assert!(results[4].is_err());
        assert!(results[9].is_err());
        assert_eq!(results[2], Ok(SensorReading::lost()));
        assert_eq!(results[5], Ok(SensorReading::lost()));
        assert!(results[0].as_ref().is_ok_and(|r| r.found));
    }

    #[test]
    fn cursor_sensor_reports_lost_pointer() {
        let feed = CursorFeed::default();
        let mut config = GameConfig::default();
        config.sensor_cadence_ms = 0;
        let mut sensor = CursorSensor::new(feed.clone(), &config);

        assert_eq!(sensor.sample(), Ok(SensorReading::lost()));
        feed.0.put(Some(Vec2::new(12.0, 34.0)));
        assert_eq!(sensor.sample(), Ok(SensorReading::found(Vec2::new(12.0, 34.0))));
    }
}
