//! The sampling thread: sensor → camera mapping → smoother → shared slot.
//!
//! Runs at the sensor's native cadence, independent of the simulation tick.
//! A sensor read failure is never fatal: the iteration is skipped, the
//! thread sleeps for `retry_delay` and tries again.  Cancellation is a shared
//! running flag checked once per iteration; [`SamplingLoop::shutdown`] waits a
//! bounded time for the thread and detaches it if it does not exit promptly.

use super::shared::SharedTrackingState;
use super::smoother::{PositionSmoother, RawSample};
use crate::config::GameConfig;
use crate::error::GameResult;
use crate::Point;
use bevy::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// What the sensor collaborator reports for one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Position in camera pixels; meaningless when `found == false`.
    pub point: Point,
    pub found: bool,
}

impl SensorReading {
    pub fn found(point: Point) -> Self {
        Self { point, found: true }
    }

    pub fn lost() -> Self {
        Self {
            point: Point::ZERO,
            found: false,
        }
    }
}

/// A source of raw tracking points, polled once per sampling iteration.
///
/// Implementations may block for their native frame interval.  `Err` means
/// no frame was available this time.
pub trait PositionSensor: Send + 'static {
    fn sample(&mut self) -> GameResult<SensorReading>;
}

impl<F> PositionSensor for F
where
    F: FnMut() -> GameResult<SensorReading> + Send + 'static,
{
    fn sample(&mut self) -> GameResult<SensorReading> {
        self()
    }
}

/// Maps camera pixels onto the playfield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMapping {
    pub camera_size: Vec2,
    pub game_size: Vec2,
    pub mirror: bool,
    /// Mapped points are clamped this far inside every playfield edge.
    pub edge_inset: f32,
}

impl From<&GameConfig> for CameraMapping {
    fn from(config: &GameConfig) -> Self {
        Self {
            camera_size: Vec2::new(config.camera_width, config.camera_height),
            game_size: Vec2::new(config.game_width, config.game_height),
            mirror: config.camera_mirror,
            edge_inset: config.segment_size,
        }
    }
}

impl CameraMapping {
    pub fn map(&self, camera_point: Point) -> Point {
        let mut p = camera_point;
        if self.mirror {
            p.x = self.camera_size.x - p.x;
        }
        let scaled = p * self.game_size / self.camera_size;
        let lo = Vec2::splat(self.edge_inset);
        let hi = (self.game_size - lo).max(lo);
        scaled.clamp(lo, hi)
    }
}

/// Timing of the sampling thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerSettings {
    /// Sleep after each successful iteration.
    pub idle: Duration,
    /// Sleep after a failed sensor read.
    pub retry_delay: Duration,
    /// Bounded wait used by [`SamplingLoop::shutdown`] callers.
    pub shutdown_timeout: Duration,
}

impl From<&GameConfig> for SamplerSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            idle: Duration::from_millis(config.sampler_idle_ms),
            retry_delay: Duration::from_millis(config.sensor_retry_ms),
            shutdown_timeout: Duration::from_secs_f32(config.sampler_shutdown_timeout.max(0.0)),
        }
    }
}

/// Handle to the running sampling thread.
pub struct SamplingLoop {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    settings: SamplerSettings,
}

impl SamplingLoop {
    /// Start the sampling thread.  Each iteration publishes one smoothed
    /// sample into `shared`.
    pub fn spawn<S: PositionSensor>(
        mut sensor: S,
        settings: SamplerSettings,
        mapping: CameraMapping,
        mut smoother: PositionSmoother,
        shared: SharedTrackingState,
    ) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("tracking-sampler".into())
            .spawn(move || {
                info!("Sampling thread started");
                while flag.load(Ordering::Acquire) {
                    let reading = match sensor.sample() {
                        Ok(reading) => reading,
                        Err(err) => {
                            debug!("{err}; retrying");
                            thread::sleep(settings.retry_delay);
                            continue;
                        }
                    };

                    let sample = if reading.found {
                        RawSample::found(mapping.map(reading.point))
                    } else {
                        RawSample::missing()
                    };
                    let smoothed = smoother.feed(sample);
                    shared.publish(smoothed, sample.found);

                    thread::sleep(settings.idle);
                }
                info!("Sampling thread stopped");
            })?;

        Ok(Self {
            running,
            handle: Some(handle),
            settings,
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the thread to stop and wait up to `timeout` for it to exit.
    ///
    /// Returns `true` if the thread exited and was joined.  A thread that is
    /// still blocked in its sensor after `timeout` is detached and `false` is
    /// returned; the process can still shut down.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        self.running.store(false, Ordering::Release);
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }

        if handle.is_finished() {
            if handle.join().is_err() {
                error!("Sampling thread panicked");
            }
            true
        } else {
            warn!(
                "Sampling thread did not stop within {:?}; detaching",
                timeout
            );
            false
        }
    }

    /// [`Self::shutdown`] with the configured timeout.
    pub fn shutdown_default(&mut self) -> bool {
        self.shutdown(self.settings.shutdown_timeout)
    }
}

impl Drop for SamplingLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
