//! Session state machine: `Menu → Playing → GameOver → Playing → …`.
//!
//! [`Session::tick`] is the whole per-tick orchestration.  It never calls out
//! to renderers, audio or persistence; everything those collaborators need is
//! returned as a list of [`GameEvent`]s, so a failing sink cannot interrupt or
//! corrupt a tick.

use crate::chain::{ChainSettings, CollisionKind, SegmentChain};
use crate::config::GameConfig;
use crate::food::{FoodKind, TargetLifecycle, TargetSettings};
use crate::tracking::SharedSlot;
use crate::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    #[default]
    Menu,
    Playing,
    GameOver,
}

/// Discrete things that happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    RoundStarted,
    BonusSpawned { position: Point },
    Consumed { kind: FoodKind, position: Point },
    Scored { amount: u32, total: u32 },
    Grown { amount: u32 },
    Boosted { duration: f32 },
    GameOver { score: u32, cause: CollisionKind },
    NewHighScore { value: u32 },
}

/// Debounce on the tracking signal: fires once the signal has been
/// continuously active for `required` seconds.  Any gap restarts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DwellTimer {
    required: f32,
    since: Option<f32>,
}

impl DwellTimer {
    pub fn new(required: f32) -> Self {
        Self {
            required,
            since: None,
        }
    }

    /// Record the signal for this tick; `true` once the dwell is complete.
    pub fn observe(&mut self, active: bool, now: f32) -> bool {
        if !active {
            self.since = None;
            return false;
        }
        let start = *self.since.get_or_insert(now);
        now - start >= self.required
    }

    /// Fraction of the dwell completed, in `[0, 1]`.
    pub fn progress(&self, now: f32) -> f32 {
        match self.since {
            Some(_) if self.required <= 0.0 => 1.0,
            Some(start) => ((now - start) / self.required).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.since = None;
    }
}

/// Session-level parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub start_dwell: f32,
    pub growth_rate: u32,
    pub game_over_flash: f32,
}

impl From<&GameConfig> for SessionSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            start_dwell: config.start_dwell,
            growth_rate: config.growth_rate,
            game_over_flash: config.game_over_flash,
        }
    }
}

/// One player's game: chain, items, score and phase.
#[derive(Debug, Clone)]
pub struct Session {
    settings: SessionSettings,
    phase: SessionPhase,
    chain: SegmentChain,
    targets: TargetLifecycle,
    dwell: DwellTimer,
    score: u32,
    high_score: u32,
    paused: bool,
    last_target: Option<Point>,
    detected: bool,
    game_over_at: Option<f32>,
}

impl Session {
    /// A session in the menu.  `high_score` is the previously persisted best.
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        Self::with_targets(config, high_score, TargetLifecycle::new(TargetSettings::from(config)))
    }

    /// As [`Session::new`] with deterministic item placement.
    pub fn with_seed(config: &GameConfig, high_score: u32, seed: u64) -> Self {
        Self::with_targets(
            config,
            high_score,
            TargetLifecycle::with_seed(TargetSettings::from(config), seed),
        )
    }

    fn with_targets(config: &GameConfig, high_score: u32, targets: TargetLifecycle) -> Self {
        let settings = SessionSettings::from(config);
        Self {
            settings,
            phase: SessionPhase::Menu,
            chain: SegmentChain::new(ChainSettings::from(config)),
            targets,
            dwell: DwellTimer::new(settings.start_dwell),
            score: 0,
            high_score,
            paused: false,
            last_target: None,
            detected: false,
            game_over_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn targets(&self) -> &TargetLifecycle {
        &self.targets
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the last tick saw a detected, valid tracking point.
    pub fn is_tracking(&self) -> bool {
        self.detected
    }

    /// Last valid smoothed target, for the pointer marker.
    pub fn last_target(&self) -> Option<Point> {
        self.last_target
    }

    /// Progress of the start dwell shown on the menu and game-over overlays.
    pub fn dwell_progress(&self, now: f32) -> f32 {
        self.dwell.progress(now)
    }

    pub fn game_over_at(&self) -> Option<f32> {
        self.game_over_at
    }

    /// True for `game_over_flash` seconds after a collision.
    pub fn flash_active(&self, now: f32) -> bool {
        self.game_over_at
            .is_some_and(|at| now < at + self.settings.game_over_flash)
    }

    // ── Control ──────────────────────────────────────────────────────────────

    /// Toggle pause while playing.  Returns the new paused flag.
    pub fn toggle_pause(&mut self) -> bool {
        if self.phase == SessionPhase::Playing {
            self.paused = !self.paused;
        }
        self.paused
    }

    /// Advance the session by one simulation tick.
    pub fn tick(&mut self, slot: SharedSlot, now: f32) -> Vec<GameEvent> {
        let active = slot.detected && slot.latest.valid;
        self.detected = active;
        if slot.latest.valid {
            self.last_target = Some(slot.latest.pixel().as_vec2());
        }

        let mut events = Vec::new();
        match self.phase {
            SessionPhase::Menu | SessionPhase::GameOver => {
                if self.dwell.observe(active, now) {
                    self.start_round(now);
                    events.push(GameEvent::RoundStarted);
                }
            }
            SessionPhase::Playing if self.paused => {}
            SessionPhase::Playing => self.play(active, now, &mut events),
        }
        events
    }

    fn start_round(&mut self, now: f32) {
        self.chain.reset();
        self.targets.reset(&self.chain, now);
        self.dwell.clear();
        self.score = 0;
        self.paused = false;
        self.game_over_at = None;
        self.phase = SessionPhase::Playing;
    }

    fn play(&mut self, active: bool, now: f32, events: &mut Vec<GameEvent>) {
        if self.targets.maybe_spawn_bonus(&self.chain, now) {
            if let Some(bonus) = self.targets.items().last() {
                events.push(GameEvent::BonusSpawned {
                    position: bonus.position,
                });
            }
        }
        self.targets.update(now);

        let target = if active { self.last_target } else { None };
        self.chain.advance(target, now);

        for eaten in self.targets.consume(&self.chain, now) {
            self.score += eaten.score_value;
            events.push(GameEvent::Consumed {
                kind: eaten.kind,
                position: eaten.position,
            });
            events.push(GameEvent::Scored {
                amount: eaten.score_value,
                total: self.score,
            });

            let growth = eaten.score_value * self.settings.growth_rate;
            self.chain.grow(growth);
            events.push(GameEvent::Grown { amount: growth });

            if eaten.kind == FoodKind::Bonus {
                self.chain.activate_boost(eaten.boost_duration, now);
                events.push(GameEvent::Boosted {
                    duration: eaten.boost_duration,
                });
            }
        }

        if let Some(cause) = self.chain.collision() {
            self.phase = SessionPhase::GameOver;
            self.game_over_at = Some(now);
            self.dwell.clear();
            events.push(GameEvent::GameOver {
                score: self.score,
                cause,
            });
            if self.score > self.high_score {
                self.high_score = self.score;
                events.push(GameEvent::NewHighScore { value: self.score });
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn targets_mut(&mut self) -> &mut TargetLifecycle {
        &mut self.targets
    }
}
