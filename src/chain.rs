//! The snake body: a chain of points at fixed spacing that chases a target.
//!
//! ## Per-tick update (`advance`)
//!
//! 1. Dead zone: a target closer than `min_move_distance` leaves the chain still.
//! 2. Desired speed eases in linearly up to `ease_distance` and is capped at
//!    [`SegmentChain::current_max_speed`] (boosted while a bonus is active).
//! 3. Velocity is low-passed toward the desired velocity (`inertia` retained).
//! 4. A new head is inserted at `head + velocity`.
//! 5. Re-spacing pass, in place: walking outward from the head, a point is
//!    kept only if it is at least `spacing` from the last kept point, and is
//!    then pulled in to exactly `spacing` along its original direction.
//! 6. Length reconciliation: points the re-spacing pass dropped are restored
//!    at the tail, then the length moves one step toward
//!    [`SegmentChain::target_length`].  Growth and shrinkage are therefore
//!    gradual: never more than one point per tick.
//!
//! ## Clock
//!
//! Every time-dependent call takes `now`, seconds on the simulation clock, so
//! the boost queries stay pure and tests stay deterministic.

use crate::config::GameConfig;
use crate::Point;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// Head touched its own body.
    SelfHit,
    /// Head entered the wall margin.
    Wall,
}

/// Parameters of [`SegmentChain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub spacing: f32,
    pub initial_length: usize,
    pub min_move_distance: f32,
    pub max_speed: f32,
    pub boost_multiplier: f32,
    pub inertia: f32,
    pub ease_distance: f32,
    pub collision_threshold: f32,
    pub self_collision_ignore: usize,
    pub wall_margin: f32,
    pub bounds: Vec2,
}

impl From<&GameConfig> for ChainSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            spacing: config.segment_spacing,
            initial_length: config.initial_length.max(2) as usize,
            min_move_distance: config.min_move_distance,
            max_speed: config.max_speed,
            boost_multiplier: config.boost_multiplier,
            inertia: config.velocity_inertia,
            ease_distance: config.ease_distance,
            collision_threshold: config.collision_threshold,
            self_collision_ignore: config.self_collision_ignore,
            wall_margin: config.wall_collision_margin,
            bounds: Vec2::new(config.game_width, config.game_height),
        }
    }
}

/// Heading used to extend the tail when its last segment has no direction.
const DEFAULT_TAIL_HEADING: Vec2 = Vec2::Y;

/// The actor's body.  Head at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentChain {
    settings: ChainSettings,
    points: VecDeque<Point>,
    velocity: Vec2,
    pending_growth: usize,
    boost_until: f32,
}

impl SegmentChain {
    pub fn new(settings: ChainSettings) -> Self {
        let mut chain = Self {
            settings,
            points: VecDeque::with_capacity(settings.initial_length * 4),
            velocity: Vec2::ZERO,
            pending_growth: 0,
            boost_until: f32::NEG_INFINITY,
        };
        chain.reset();
        chain
    }

    /// Back to the initial state: a horizontal chain centred on the
    /// playfield, trailing to the left, at rest, with no growth or boost.
    pub fn reset(&mut self) {
        let center = self.settings.bounds * 0.5;
        self.points.clear();
        self.points.extend(
            (0..self.settings.initial_length)
                .map(|i| center - Vec2::new(i as f32 * self.settings.spacing, 0.0)),
        );
        self.velocity = Vec2::ZERO;
        self.pending_growth = 0;
        self.boost_until = f32::NEG_INFINITY;
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn head(&self) -> Point {
        self.points[0]
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a chain never has fewer than two points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Length the chain converges toward: `initial_length + pending_growth`.
    #[inline]
    pub fn target_length(&self) -> usize {
        self.settings.initial_length + self.pending_growth
    }

    // ── Growth / boost ───────────────────────────────────────────────────────

    pub fn grow(&mut self, amount: u32) {
        self.pending_growth += amount as usize;
    }

    /// Start (or refresh) a speed boost lasting `duration` seconds from `now`.
    ///
    /// A second activation replaces the expiry; durations do not stack.
    pub fn activate_boost(&mut self, duration: f32, now: f32) {
        self.boost_until = now + duration;
    }

    #[inline]
    pub fn is_boosted(&self, now: f32) -> bool {
        now < self.boost_until
    }

    /// Seconds of boost left, `0.0` when inactive.
    pub fn boost_remaining(&self, now: f32) -> f32 {
        (self.boost_until - now).max(0.0)
    }

    pub fn current_max_speed(&self, now: f32) -> f32 {
        if self.is_boosted(now) {
            self.settings.max_speed * self.settings.boost_multiplier
        } else {
            self.settings.max_speed
        }
    }

    // ── Movement ─────────────────────────────────────────────────────────────

    /// Move one tick toward `target`.  `None` holds position.
    pub fn advance(&mut self, target: Option<Point>, now: f32) {
        let Some(target) = target else {
            return;
        };

        let head = self.head();
        let offset = target - head;
        let distance = offset.length();
        if distance < self.settings.min_move_distance || distance <= 0.0 {
            return;
        }

        let ease = (distance / self.settings.ease_distance).min(1.0);
        let desired = offset / distance * self.current_max_speed(now) * ease;
        let inertia = self.settings.inertia;
        self.velocity = self.velocity * inertia + desired * (1.0 - inertia);

        let length_before = self.points.len();
        self.points.push_front(head + self.velocity);
        self.respace();
        self.reconcile_length(length_before);
    }

    /// Drop points closer than `spacing` to the last kept point and pull the
    /// kept ones in to exactly `spacing`.
    fn respace(&mut self) {
        let spacing = self.settings.spacing;
        let mut kept = 1;
        for i in 1..self.points.len() {
            let anchor = self.points[kept - 1];
            let offset = self.points[i] - anchor;
            let dist = offset.length();
            if dist >= spacing && dist > 0.0 {
                self.points[kept] = anchor + offset * (spacing / dist);
                kept += 1;
            }
        }
        self.points.truncate(kept);
    }

    fn reconcile_length(&mut self, length_before: usize) {
        let target = self.target_length();
        let goal = match length_before.cmp(&target) {
            std::cmp::Ordering::Less => length_before + 1,
            std::cmp::Ordering::Greater => length_before - 1,
            std::cmp::Ordering::Equal => length_before,
        };
        while self.points.len() < goal {
            self.extend_tail();
        }
        self.points.truncate(goal);
    }

    /// Append one point `spacing` beyond the tail along the tail's heading.
    fn extend_tail(&mut self) {
        let n = self.points.len();
        let tail = self.points[n - 1];
        let heading = if n >= 2 {
            (tail - self.points[n - 2]).normalize_or_zero()
        } else {
            Vec2::ZERO
        };
        let heading = if heading == Vec2::ZERO {
            DEFAULT_TAIL_HEADING
        } else {
            heading
        };
        self.points.push_back(tail + heading * self.settings.spacing);
    }

    // ── Collisions ───────────────────────────────────────────────────────────

    /// Head within `collision_threshold` of any point beyond the first
    /// `self_collision_ignore` points.  Never true for a chain of that length
    /// or shorter.
    pub fn check_self_collision(&self) -> bool {
        let ignore = self.settings.self_collision_ignore;
        if self.points.len() <= ignore {
            return false;
        }
        let head = self.head();
        self.points
            .iter()
            .skip(ignore)
            .any(|p| head.distance(*p) < self.settings.collision_threshold)
    }

    /// Head within `wall_margin` of any playfield edge.
    pub fn check_wall_collision(&self) -> bool {
        let head = self.head();
        let margin = self.settings.wall_margin;
        let bounds = self.settings.bounds;
        head.x < margin || head.x > bounds.x - margin || head.y < margin || head.y > bounds.y - margin
    }

    /// Self-collision takes precedence when both apply.
    pub fn collision(&self) -> Option<CollisionKind> {
        if self.check_self_collision() {
            Some(CollisionKind::SelfHit)
        } else if self.check_wall_collision() {
            Some(CollisionKind::Wall)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub(crate) fn set_points(&mut self, points: impl IntoIterator<Item = Point>) {
        self.points = points.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SegmentChain {
        SegmentChain::new(ChainSettings::from(&GameConfig::default()))
    }

    fn assert_spacing(chain: &SegmentChain) {
        let spacing = chain.settings().spacing;
        let pts: Vec<_> = chain.points().collect();
        for (i, pair) in pts.windows(2).enumerate() {
            let d = pair[0].distance(pair[1]);
            assert!(
                (d - spacing).abs() < 1e-3,
                "link {i} has length {d}, expected {spacing}"
            );
        }
    }

    #[test]
    fn reset_lays_out_initial_chain() {
        let c = chain();
        assert_eq!(c.len(), 7);
        assert_eq!(c.head(), Vec2::new(400.0, 300.0));
        assert_spacing(&c);
        assert_eq!(c.velocity(), Vec2::ZERO);
    }

    #[test]
    fn advance_none_is_a_no_op() {
        let mut c = chain();
        c.advance(Some(Vec2::new(600.0, 200.0)), 0.0);
        let before = c.clone();
        c.advance(None, 1.0);
        assert_eq!(c, before);
    }

    #[test]
    fn dead_zone_keeps_head_still() {
        let mut c = chain();
        let head = c.head();
        let before = c.clone();
        c.advance(Some(head + Vec2::new(1.0, 1.0)), 0.0);
        assert_eq!(c.head(), head);
        assert_eq!(c, before);
    }

    #[test]
    fn head_reaches_distant_target_monotonically() {
        let mut c = chain();
        let target = c.head() + Vec2::new(300.0, 0.0);
        let min_move = c.settings().min_move_distance;
        let mut last = c.head().distance(target);
        let mut reached = false;
        for tick in 0..2_000 {
            c.advance(Some(target), tick as f32 / 60.0);
            let d = c.head().distance(target);
            assert!(d <= last + 1e-3, "tick {tick}: distance rose {last} -> {d}");
            last = d;
            if d < min_move {
                reached = true;
                break;
            }
        }
        assert!(reached, "head stalled {last} px from the target");
        assert_eq!(c.len(), 7);
    }

    #[test]
    fn spacing_is_exact_while_chasing_a_moving_target() {
        let mut c = chain();
        c.grow(20);
        for tick in 0..3_000 {
            let t = tick as f32 * 0.03;
            let target = Vec2::new(400.0 + 150.0 * t.cos(), 300.0 + 150.0 * (t * 1.3).sin());
            c.advance(Some(target), tick as f32 / 60.0);
            assert_spacing(&c);
        }
        assert_eq!(c.len(), c.target_length());
    }

    #[test]
    fn growth_is_gradual_and_monotonic() {
        let mut c = chain();
        c.grow(10);
        let mut lengths = vec![c.len()];
        for tick in 0..40 {
            c.advance(Some(Vec2::new(700.0, 300.0)), tick as f32 / 60.0);
            lengths.push(c.len());
        }
        for pair in lengths.windows(2) {
            assert!(pair[1] >= pair[0], "length shrank while growing: {lengths:?}");
            assert!(pair[1] - pair[0] <= 1, "length jumped: {lengths:?}");
        }
        assert_eq!(c.len(), 17);
        assert_spacing(&c);
    }

    #[test]
    fn shrink_trims_one_point_per_tick() {
        let mut c = chain();
        c.set_points((0..10).map(|i| Vec2::new(400.0 - i as f32 * 5.0, 300.0)));
        let mut lengths = vec![c.len()];
        for tick in 0..10 {
            c.advance(Some(Vec2::new(700.0, 300.0)), tick as f32 / 60.0);
            lengths.push(c.len());
        }
        assert_eq!(&lengths[..4], &[10, 9, 8, 7], "got {lengths:?}");
        assert!(lengths[4..].iter().all(|&l| l == 7));
    }

    #[test]
    fn degenerate_tail_extends_along_default_heading() {
        let mut c = chain();
        c.set_points([Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0)]);
        c.extend_tail();
        assert_eq!(c.points().last(), Some(Vec2::new(100.0, 105.0)));
    }

    #[test]
    fn boost_raises_speed_and_refreshes_instead_of_stacking() {
        let mut c = chain();
        assert_eq!(c.current_max_speed(0.0), 4.0);
        c.activate_boost(5.0, 10.0);
        assert_eq!(c.current_max_speed(12.0), 6.0);
        c.activate_boost(5.0, 13.0);
        assert!((c.boost_remaining(14.0) - 4.0).abs() < 1e-6);
        assert!(c.is_boosted(17.9));
        assert!(!c.is_boosted(18.0));
        assert_eq!(c.current_max_speed(18.0), 4.0);
    }

    #[test]
    fn self_collision_ignores_short_chains() {
        let mut c = chain();
        // Five points all on top of the head: within threshold but all ignored.
        c.set_points(std::iter::repeat(Vec2::new(300.0, 300.0)).take(5));
        assert!(!c.check_self_collision());
    }

    #[test]
    fn self_collision_detects_a_loop() {
        let mut c = chain();
        // A tight square loop: point 6 comes back next to the head.
        c.set_points([
            Vec2::new(300.0, 300.0),
            Vec2::new(305.0, 300.0),
            Vec2::new(310.0, 300.0),
            Vec2::new(310.0, 305.0),
            Vec2::new(310.0, 310.0),
            Vec2::new(305.0, 310.0),
            Vec2::new(300.0, 308.0),
        ]);
        assert!(c.check_self_collision());
        assert_eq!(c.collision(), Some(CollisionKind::SelfHit));
    }

    #[test]
    fn straight_chain_does_not_self_collide() {
        let c = chain();
        assert!(!c.check_self_collision());
        assert_eq!(c.collision(), None);
    }

    #[test]
    fn wall_collision_near_left_edge() {
        let mut c = chain();
        c.set_points([Vec2::new(4.0, 300.0), Vec2::new(9.0, 300.0)]);
        assert!(c.check_wall_collision());
        assert_eq!(c.collision(), Some(CollisionKind::Wall));

        c.set_points([Vec2::new(6.0, 300.0), Vec2::new(11.0, 300.0)]);
        assert!(!c.check_wall_collision());
    }

    #[test]
    fn wall_collision_on_every_edge() {
        let mut c = chain();
        for head in [
            Vec2::new(796.0, 300.0),
            Vec2::new(400.0, 4.0),
            Vec2::new(400.0, 596.0),
        ] {
            c.set_points([head, head + Vec2::new(0.0, 5.0)]);
            assert!(c.check_wall_collision(), "head {head} should hit a wall");
        }
    }

    #[test]
    fn reset_clears_growth_velocity_and_boost() {
        let mut c = chain();
        c.grow(4);
        c.activate_boost(5.0, 0.0);
        c.advance(Some(Vec2::new(700.0, 300.0)), 0.1);
        c.reset();
        assert_eq!(c.target_length(), 7);
        assert_eq!(c.velocity(), Vec2::ZERO);
        assert!(!c.is_boosted(0.2));
    }
}
