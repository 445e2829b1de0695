//! Consumable target items and their lifecycle.
//!
//! Regular items loop forever: `visible → consumed → cooldown → visible`, being
//! relocated at the moment they are eaten and reappearing after
//! `regular_cooldown`.  Bonus items are created by a randomised timer and are
//! removed outright when eaten.

use crate::chain::SegmentChain;
use crate::config::GameConfig;
use crate::Point;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Regular,
    Bonus,
}

/// One consumable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetItem {
    pub position: Point,
    pub radius: f32,
    pub score_value: u32,
    /// Speed boost granted on consumption; `0.0` for regular items.
    pub boost_duration: f32,
    pub visible: bool,
    /// Simulation time at which a hidden item becomes visible again.
    pub reappear_at: f32,
    pub kind: FoodKind,
}

impl TargetItem {
    #[inline]
    pub fn is_special(&self) -> bool {
        self.kind == FoodKind::Bonus
    }
}

/// Reported once per item eaten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Consumption {
    pub kind: FoodKind,
    /// Where the item was when it was eaten.
    pub position: Point,
    pub score_value: u32,
    pub boost_duration: f32,
}

/// Parameters of [`TargetLifecycle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSettings {
    pub regular_radius: f32,
    pub bonus_radius: f32,
    pub segment_size: f32,
    pub spawn_margin: f32,
    pub clearance_buffer: f32,
    pub spawn_attempts: u32,
    pub regular_cooldown: f32,
    pub regular_score: u32,
    pub bonus_score: u32,
    pub bonus_boost_duration: f32,
    pub first_bonus_delay: f32,
    pub bonus_interval: (f32, f32),
    pub max_active_items: usize,
    pub bounds: Vec2,
}

impl From<&GameConfig> for TargetSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            regular_radius: config.food_size,
            bonus_radius: config.bonus_food_size,
            segment_size: config.segment_size,
            spawn_margin: config.food_spawn_margin,
            clearance_buffer: config.spawn_clearance_buffer,
            spawn_attempts: config.spawn_attempts.max(1),
            regular_cooldown: config.regular_cooldown,
            regular_score: config.regular_score,
            bonus_score: config.bonus_score,
            bonus_boost_duration: config.bonus_boost_duration,
            first_bonus_delay: config.first_bonus_delay,
            bonus_interval: (config.bonus_interval_min, config.bonus_interval_max),
            max_active_items: config.max_active_items,
            bounds: Vec2::new(config.game_width, config.game_height),
        }
    }
}

/// Owns the active item set, the bonus timer and the placement RNG.
#[derive(Debug, Clone)]
pub struct TargetLifecycle {
    settings: TargetSettings,
    items: Vec<TargetItem>,
    next_bonus_at: f32,
    rng: StdRng,
}

impl TargetLifecycle {
    pub fn new(settings: TargetSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    /// Deterministic placement for tests and replays.
    pub fn with_seed(settings: TargetSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: TargetSettings, rng: StdRng) -> Self {
        Self {
            settings,
            items: Vec::new(),
            next_bonus_at: f32::INFINITY,
            rng,
        }
    }

    pub fn items(&self) -> &[TargetItem] {
        &self.items
    }

    pub fn next_bonus_at(&self) -> f32 {
        self.next_bonus_at
    }

    /// Start a round: one regular item clear of `chain`, first bonus armed.
    pub fn reset(&mut self, chain: &SegmentChain, now: f32) {
        self.items.clear();
        let position = self.find_spawn_position(self.settings.regular_radius, chain);
        self.items.push(self.regular_item(position, true, now));
        self.next_bonus_at = now + self.settings.first_bonus_delay;
    }

    /// Reveal items whose cooldown has elapsed.
    pub fn update(&mut self, now: f32) {
        for item in self.items.iter_mut().filter(|i| !i.visible) {
            if now >= item.reappear_at {
                item.visible = true;
            }
        }
    }

    /// Spawn a bonus item if the timer has elapsed and there is room.
    pub fn maybe_spawn_bonus(&mut self, chain: &SegmentChain, now: f32) -> bool {
        if self.items.len() >= self.settings.max_active_items || now < self.next_bonus_at {
            return false;
        }
        let position = self.find_spawn_position(self.settings.bonus_radius, chain);
        self.items.push(TargetItem {
            position,
            radius: self.settings.bonus_radius,
            score_value: self.settings.bonus_score,
            boost_duration: self.settings.bonus_boost_duration,
            visible: true,
            reappear_at: now,
            kind: FoodKind::Bonus,
        });
        let (lo, hi) = self.settings.bonus_interval;
        self.next_bonus_at = now + self.rng.gen_range(lo..=hi);
        debug!(
            "bonus spawned at ({:.0}, {:.0}); next in {:.1}s",
            position.x,
            position.y,
            self.next_bonus_at - now
        );
        true
    }

    /// Every visible item the head is touching is consumed, at most once.
    ///
    /// Regular items move to a fresh position and hide for `regular_cooldown`;
    /// bonus items are removed.
    pub fn consume(&mut self, chain: &SegmentChain, now: f32) -> Vec<Consumption> {
        let head = chain.head();
        let reach = self.settings.segment_size * 0.5;
        let mut eaten = Vec::new();
        let mut i = 0;
        while i < self.items.len() {
            let item = self.items[i];
            if !item.visible || head.distance(item.position) >= item.radius + reach {
                i += 1;
                continue;
            }

            eaten.push(Consumption {
                kind: item.kind,
                position: item.position,
                score_value: item.score_value,
                boost_duration: item.boost_duration,
            });
            match item.kind {
                FoodKind::Bonus => {
                    self.items.remove(i);
                }
                FoodKind::Regular => {
                    let position = self.find_spawn_position(item.radius, chain);
                    let respawned = self.regular_item(position, false, now);
                    self.items[i] = respawned;
                    i += 1;
                }
            }
        }
        eaten
    }

    /// A random point inside the inset playfield at least
    /// `segment_size + radius + clearance_buffer` from every chain point.
    ///
    /// After `spawn_attempts` failures an unvalidated point is returned, so an
    /// item can occasionally overlap the body at spawn.
    pub fn find_spawn_position(&mut self, radius: f32, chain: &SegmentChain) -> Point {
        let clearance = self.settings.segment_size + radius + self.settings.clearance_buffer;
        for _ in 0..self.settings.spawn_attempts {
            let candidate = self.random_point();
            if chain.points().all(|p| p.distance(candidate) >= clearance) {
                return candidate;
            }
        }
        let fallback = self.random_point();
        debug!(
            "no clear spawn after {} attempts; placing at ({:.0}, {:.0})",
            self.settings.spawn_attempts, fallback.x, fallback.y
        );
        fallback
    }

    fn random_point(&mut self) -> Point {
        let margin = self.settings.spawn_margin;
        let hi = (self.settings.bounds - Vec2::splat(margin)).max(Vec2::splat(margin));
        Vec2::new(
            self.rng.gen_range(margin..=hi.x),
            self.rng.gen_range(margin..=hi.y),
        )
    }

    fn regular_item(&self, position: Point, visible: bool, now: f32) -> TargetItem {
        TargetItem {
            position,
            radius: self.settings.regular_radius,
            score_value: self.settings.regular_score,
            boost_duration: 0.0,
            visible,
            reappear_at: if visible {
                now
            } else {
                now + self.settings.regular_cooldown
            },
            kind: FoodKind::Regular,
        }
    }

    #[cfg(test)]
    pub(crate) fn items_mut(&mut self) -> &mut Vec<TargetItem> {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainSettings;

    fn fixture() -> (TargetLifecycle, SegmentChain) {
        let config = GameConfig::default();
        let targets = TargetLifecycle::with_seed(TargetSettings::from(&config), 7);
        let chain = SegmentChain::new(ChainSettings::from(&config));
        (targets, chain)
    }

    #[test]
    fn reset_places_one_regular_item_clear_of_the_chain() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        assert_eq!(targets.items().len(), 1);
        let item = targets.items()[0];
        assert_eq!(item.kind, FoodKind::Regular);
        assert!(item.visible);
        for p in chain.points() {
            assert!(p.distance(item.position) >= 14.0 + 15.0 + 10.0);
        }
        assert_eq!(targets.next_bonus_at(), 15.0);
    }

    #[test]
    fn item_under_head_is_consumed_exactly_once() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        targets.items_mut()[0].position = chain.head();

        let first = targets.consume(&chain, 1.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, FoodKind::Regular);
        assert_eq!(first[0].score_value, 1);
        assert!(!targets.items()[0].visible);

        // Force the hidden item back under the head: still not edible.
        targets.items_mut()[0].position = chain.head();
        assert!(targets.consume(&chain, 1.1).is_empty());
    }

    #[test]
    fn consumption_radius_is_item_radius_plus_half_segment() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        // 15 + 14/2 = 22
        targets.items_mut()[0].position = chain.head() + Vec2::new(0.0, 22.5);
        assert!(targets.consume(&chain, 0.0).is_empty());
        targets.items_mut()[0].position = chain.head() + Vec2::new(0.0, 21.5);
        assert_eq!(targets.consume(&chain, 0.0).len(), 1);
    }

    #[test]
    fn regular_item_reappears_after_cooldown() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        targets.items_mut()[0].position = chain.head();
        targets.consume(&chain, 2.0);

        targets.update(2.4);
        assert!(!targets.items()[0].visible);
        targets.update(2.5);
        assert!(targets.items()[0].visible);
        assert_ne!(targets.items()[0].position, chain.head());
    }

    #[test]
    fn bonus_item_is_removed_and_grants_boost() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        assert!(targets.maybe_spawn_bonus(&chain, 15.0));
        let bonus = targets
            .items()
            .iter()
            .position(TargetItem::is_special)
            .expect("bonus spawned");
        targets.items_mut()[bonus].position = chain.head();

        let eaten = targets.consume(&chain, 16.0);
        assert_eq!(eaten.len(), 1);
        assert_eq!(eaten[0].kind, FoodKind::Bonus);
        assert_eq!(eaten[0].score_value, 5);
        assert_eq!(eaten[0].boost_duration, 5.0);
        assert_eq!(targets.items().len(), 1);
        assert!(!targets.items().iter().any(TargetItem::is_special));
    }

    #[test]
    fn bonus_timer_waits_then_rearms_within_interval() {
        let (mut targets, chain) = fixture();
        targets.reset(&chain, 0.0);
        assert!(!targets.maybe_spawn_bonus(&chain, 14.9));
        assert!(targets.maybe_spawn_bonus(&chain, 15.0));
        assert_eq!(targets.items().len(), 2);
        let next = targets.next_bonus_at();
        assert!((35.0..=45.0).contains(&next), "next bonus at {next}");
        // Two items active: no room even once the timer fires.
        assert!(!targets.maybe_spawn_bonus(&chain, 50.0));
    }

    #[test]
    fn placements_respect_margin_and_clearance() {
        let (mut targets, chain) = fixture();
        for _ in 0..500 {
            let p = targets.find_spawn_position(20.0, &chain);
            assert!((50.0..=750.0).contains(&p.x) && (50.0..=550.0).contains(&p.y));
            for seg in chain.points() {
                assert!(seg.distance(p) >= 14.0 + 20.0 + 10.0, "{p} too close to {seg}");
            }
        }
    }

    #[test]
    fn exhausted_attempts_fall_back_to_unvalidated_position() {
        let config = GameConfig {
            spawn_clearance_buffer: 10_000.0,
            ..GameConfig::default()
        };
        let mut targets = TargetLifecycle::with_seed(TargetSettings::from(&config), 3);
        let chain = SegmentChain::new(ChainSettings::from(&config));
        let p = targets.find_spawn_position(15.0, &chain);
        assert!((50.0..=750.0).contains(&p.x) && (50.0..=550.0).contains(&p.y));
    }
}
