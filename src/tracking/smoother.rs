//! Two-stage position smoother for the raw sensor stream.
//!
//! Stage 1 is a weighted moving average over the last `window` accepted
//! points with linearly increasing recency weights (`1, 2, …, n` normalised
//! by `n(n+1)/2`).  Stage 2 is an exponential filter
//! `s ← s + (avg − s)·α`, which is `s·(1−α) + avg·α` written so that a
//! constant input reproduces itself exactly.
//!
//! State stays in `f32` throughout; truncation to whole pixels happens only
//! at the read boundary ([`SmoothedTarget::pixel`]), so rounding never
//! compounds.
//!
//! ## Misses and outliers
//!
//! * A sample with `found == false` is ignored entirely: it is not pushed into
//!   the history and does not touch the exponential state.
//! * A found point further than `jump_threshold` from the last accepted point
//!   is treated as a misdetection and the previous output is re-emitted.
//!   After `max_consecutive_jumps` rejections in a row the new location is
//!   taken as genuine: history is cleared and the filter re-seeds there.
//!   `0` disables relocation.

use crate::config::GameConfig;
use crate::Point;
use bevy::prelude::*;
use std::collections::VecDeque;
use std::time::Instant;

/// One sensor reading, already mapped into playfield pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Meaningless when `found == false`.
    pub point: Point,
    pub found: bool,
    pub timestamp: Instant,
}

impl RawSample {
    pub fn found(point: Point) -> Self {
        Self {
            point,
            found: true,
            timestamp: Instant::now(),
        }
    }

    pub fn missing() -> Self {
        Self {
            point: Point::ZERO,
            found: false,
            timestamp: Instant::now(),
        }
    }
}

/// Smoother output.  `valid == false` only before the first accepted sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothedTarget {
    pub point: Point,
    pub valid: bool,
}

impl SmoothedTarget {
    pub const INVALID: Self = Self {
        point: Point::ZERO,
        valid: false,
    };

    /// A valid target at `point`.
    pub fn at(point: Point) -> Self {
        Self { point, valid: true }
    }

    /// Whole-pixel position (truncated toward zero).
    #[inline]
    pub fn pixel(&self) -> IVec2 {
        self.point.as_ivec2()
    }
}

/// Parameters of [`PositionSmoother`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmootherSettings {
    pub window: usize,
    pub factor: f32,
    pub jump_threshold: f32,
    pub max_consecutive_jumps: u32,
}

impl From<&GameConfig> for SmootherSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            window: config.smoothing_window.max(1),
            factor: config.smoothing_factor,
            jump_threshold: config.jump_threshold,
            max_consecutive_jumps: config.max_consecutive_jumps,
        }
    }
}

/// Converts a possibly-missing raw point stream into a continuous target.
///
/// Single-writer: `feed` is called sequentially from the sampling thread.
#[derive(Debug, Clone)]
pub struct PositionSmoother {
    settings: SmootherSettings,
    history: VecDeque<Point>,
    smoothed: Option<Point>,
    last_accepted: Option<Point>,
    rejected_run: u32,
}

impl PositionSmoother {
    pub fn new(settings: SmootherSettings) -> Self {
        Self {
            history: VecDeque::with_capacity(settings.window),
            settings,
            smoothed: None,
            last_accepted: None,
            rejected_run: 0,
        }
    }

    /// Feed one raw sample and return the current smoothed target.
    pub fn feed(&mut self, sample: RawSample) -> SmoothedTarget {
        if !sample.found {
            return self.current();
        }

        if let Some(anchor) = self.last_accepted {
            let jump = sample.point.distance(anchor);
            if jump > self.settings.jump_threshold {
                self.rejected_run += 1;
                let limit = self.settings.max_consecutive_jumps;
                if limit == 0 || self.rejected_run < limit {
                    debug!(
                        "tracking glitch: {:.0}px jump rejected ({} in a row)",
                        jump, self.rejected_run
                    );
                    return self.current();
                }
                debug!(
                    "tracked point relocated after {} rejected jumps; re-seeding",
                    self.rejected_run
                );
                self.history.clear();
                self.smoothed = None;
            }
        }

        self.rejected_run = 0;
        self.last_accepted = Some(sample.point);

        if self.history.len() == self.settings.window {
            self.history.pop_front();
        }
        self.history.push_back(sample.point);

        let averaged = self.weighted_average();
        let next = match self.smoothed {
            Some(previous) => previous + (averaged - previous) * self.settings.factor,
            None => averaged,
        };
        self.smoothed = Some(next);
        self.current()
    }

    /// The last emitted target without feeding anything.
    pub fn current(&self) -> SmoothedTarget {
        self.smoothed
            .map(SmoothedTarget::at)
            .unwrap_or(SmoothedTarget::INVALID)
    }

    /// Forget all history, as if no sample had ever arrived.
    pub fn reset(&mut self) {
        self.history.clear();
        self.smoothed = None;
        self.last_accepted = None;
        self.rejected_run = 0;
    }

    /// Number of points currently in the moving-average window.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn weighted_average(&self) -> Point {
        let count = self.history.len();
        let total_weight = (count * (count + 1) / 2) as f32;
        let weighted = self
            .history
            .iter()
            .enumerate()
            .fold(Point::ZERO, |acc, (i, p)| acc + *p * (i + 1) as f32);
        weighted / total_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> PositionSmoother {
        PositionSmoother::new(SmootherSettings::from(&GameConfig::default()))
    }

    fn feed_xy(s: &mut PositionSmoother, x: f32, y: f32) -> SmoothedTarget {
        s.feed(RawSample::found(Vec2::new(x, y)))
    }

    #[test]
    fn invalid_before_first_sample() {
        let mut s = smoother();
        assert!(!s.current().valid);
        assert!(!s.feed(RawSample::missing()).valid);
    }

    #[test]
    fn first_sample_initialises_exactly() {
        let mut s = smoother();
        let out = feed_xy(&mut s, 123.0, 45.0);
        assert!(out.valid);
        assert_eq!(out.point, Vec2::new(123.0, 45.0));
    }

    #[test]
    fn constant_stream_converges_to_exact_point() {
        let mut s = smoother();
        let mut out = SmoothedTarget::INVALID;
        for _ in 0..SmootherSettings::from(&GameConfig::default()).window * 2 {
            out = feed_xy(&mut s, 200.0, 150.0);
        }
        assert_eq!(out.point, Vec2::new(200.0, 150.0));
        assert_eq!(out.pixel(), IVec2::new(200, 150));
    }

    #[test]
    fn recency_weighting_and_exponential_stage() {
        let mut s = smoother();
        feed_xy(&mut s, 0.0, 0.0);
        // avg = (0·1 + 30·2) / 3 = 20; s = 0 + (20 − 0)·0.15 = 3
        let out = feed_xy(&mut s, 30.0, 0.0);
        assert!((out.point.x - 3.0).abs() < 1e-5, "got {}", out.point.x);
        assert_eq!(out.point.y, 0.0);
    }

    #[test]
    fn window_drops_oldest_samples() {
        let mut s = PositionSmoother::new(SmootherSettings {
            window: 2,
            factor: 1.0,
            jump_threshold: 1_000.0,
            max_consecutive_jumps: 0,
        });
        feed_xy(&mut s, 0.0, 0.0);
        feed_xy(&mut s, 90.0, 0.0);
        let out = feed_xy(&mut s, 90.0, 0.0);
        assert_eq!(s.history_len(), 2);
        assert_eq!(out.point.x, 90.0, "0.0 must have left the window");
    }

    #[test]
    fn missing_sample_does_not_perturb_state() {
        let mut with_gap = smoother();
        let mut without_gap = smoother();
        for (x, y) in [(100.0, 100.0), (104.0, 102.0), (109.0, 101.0)] {
            feed_xy(&mut with_gap, x, y);
            feed_xy(&mut without_gap, x, y);
        }

        let before = with_gap.current();
        let during = with_gap.feed(RawSample::missing());
        assert_eq!(before, during, "a miss must re-emit the previous output");

        let a = feed_xy(&mut with_gap, 112.0, 103.0);
        let b = feed_xy(&mut without_gap, 112.0, 103.0);
        assert_eq!(a, b, "a miss must leave no trace in the history");
    }

    #[test]
    fn single_outlier_is_rejected() {
        let mut s = smoother();
        for _ in 0..5 {
            feed_xy(&mut s, 300.0, 300.0);
        }
        let stable = s.current();
        let out = feed_xy(&mut s, 750.0, 20.0);
        assert_eq!(out, stable, "a single jump must not move the output");

        // Tracking resumes normally near the last accepted point.
        let next = feed_xy(&mut s, 302.0, 300.0);
        assert!(next.point.x > stable.point.x);
        assert!(next.point.x < 302.0);
    }

    #[test]
    fn sustained_jump_is_accepted_as_relocation() {
        let settings = SmootherSettings::from(&GameConfig::default());
        let mut s = PositionSmoother::new(settings);
        feed_xy(&mut s, 100.0, 100.0);

        let mut out = SmoothedTarget::INVALID;
        for _ in 0..settings.max_consecutive_jumps {
            out = feed_xy(&mut s, 600.0, 500.0);
        }
        assert_eq!(out.point, Vec2::new(600.0, 500.0));
        assert_eq!(s.history_len(), 1);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut s = smoother();
        feed_xy(&mut s, 50.0, 60.0);
        s.reset();
        assert!(!s.current().valid);
        assert_eq!(s.history_len(), 0);
        // No anchor left, so a far point is accepted immediately.
        assert_eq!(feed_xy(&mut s, 700.0, 500.0).point, Vec2::new(700.0, 500.0));
    }
}
