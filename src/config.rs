//! Runtime game configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  The binary calls [`GameConfig::load_or_default`]
//! before the sampling thread starts, since both the thread and the app need
//! the final values.  Missing keys fall back to the compile-time defaults, so
//! a minimal TOML can override just the constants you care about.
//!
//! ## Usage
//!
//! Core components never read `GameConfig` fields ad hoc; each builds its own
//! settings view (`ChainSettings`, `SmootherSettings`, `TargetSettings`,
//! `SamplerSettings`, `CameraMapping`) from a `&GameConfig`.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{
    validate_at_least, validate_non_negative, validate_positive, validate_retention,
    validate_unit_interval, GameError, GameResult,
};
use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;

/// Default path of the configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/game.toml";

/// Runtime-tunable gameplay, tracking and timing configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/game.toml`.
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Playfield ────────────────────────────────────────────────────────────
    pub game_width: f32,
    pub game_height: f32,
    pub tick_hz: f64,

    // ── Sensor / Camera ──────────────────────────────────────────────────────
    pub camera_width: f32,
    pub camera_height: f32,
    pub camera_mirror: bool,

    // ── Chain ────────────────────────────────────────────────────────────────
    pub segment_size: f32,
    pub segment_spacing: f32,
    pub initial_length: u32,
    pub growth_rate: u32,
    pub min_move_distance: f32,
    pub max_speed: f32,
    pub boost_multiplier: f32,
    pub velocity_inertia: f32,
    pub ease_distance: f32,

    // ── Collisions ───────────────────────────────────────────────────────────
    pub collision_threshold: f32,
    pub self_collision_ignore: usize,
    pub wall_collision_margin: f32,

    // ── Smoothing ────────────────────────────────────────────────────────────
    pub smoothing_window: usize,
    pub smoothing_factor: f32,
    pub jump_threshold: f32,
    pub max_consecutive_jumps: u32,

    // ── Food ─────────────────────────────────────────────────────────────────
    pub food_size: f32,
    pub bonus_food_size: f32,
    pub food_spawn_margin: f32,
    pub spawn_clearance_buffer: f32,
    pub spawn_attempts: u32,
    pub regular_cooldown: f32,
    pub regular_score: u32,
    pub bonus_score: u32,
    pub bonus_boost_duration: f32,
    pub first_bonus_delay: f32,
    pub bonus_interval_min: f32,
    pub bonus_interval_max: f32,
    pub max_active_items: usize,

    // ── Session ──────────────────────────────────────────────────────────────
    pub start_dwell: f32,
    pub game_over_flash: f32,

    // ── Sampling thread ──────────────────────────────────────────────────────
    pub sampler_idle_ms: u64,
    pub sensor_retry_ms: u64,
    pub sampler_shutdown_timeout: f32,
    pub sensor_cadence_ms: u64,

    // ── Persistence / Rendering ──────────────────────────────────────────────
    pub high_score_path: String,
    pub hud_font_size: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Playfield
            game_width: GAME_WIDTH,
            game_height: GAME_HEIGHT,
            tick_hz: TICK_HZ,
            // Sensor / Camera
            camera_width: CAMERA_WIDTH,
            camera_height: CAMERA_HEIGHT,
            camera_mirror: CAMERA_MIRROR,
            // Chain
            segment_size: SEGMENT_SIZE,
            segment_spacing: SEGMENT_SPACING,
            initial_length: INITIAL_LENGTH,
            growth_rate: GROWTH_RATE,
            min_move_distance: MIN_MOVE_DISTANCE,
            max_speed: MAX_SPEED,
            boost_multiplier: BOOST_MULTIPLIER,
            velocity_inertia: VELOCITY_INERTIA,
            ease_distance: EASE_DISTANCE,
            // Collisions
            collision_threshold: COLLISION_THRESHOLD,
            self_collision_ignore: SELF_COLLISION_IGNORE,
            wall_collision_margin: WALL_COLLISION_MARGIN,
            // Smoothing
            smoothing_window: SMOOTHING_WINDOW,
            smoothing_factor: SMOOTHING_FACTOR,
            jump_threshold: JUMP_THRESHOLD,
            max_consecutive_jumps: MAX_CONSECUTIVE_JUMPS,
            // Food
            food_size: FOOD_SIZE,
            bonus_food_size: BONUS_FOOD_SIZE,
            food_spawn_margin: FOOD_SPAWN_MARGIN,
            spawn_clearance_buffer: SPAWN_CLEARANCE_BUFFER,
            spawn_attempts: SPAWN_ATTEMPTS,
            regular_cooldown: REGULAR_COOLDOWN,
            regular_score: REGULAR_SCORE,
            bonus_score: BONUS_SCORE,
            bonus_boost_duration: BONUS_BOOST_DURATION,
            first_bonus_delay: FIRST_BONUS_DELAY,
            bonus_interval_min: BONUS_INTERVAL_MIN,
            bonus_interval_max: BONUS_INTERVAL_MAX,
            max_active_items: MAX_ACTIVE_ITEMS,
            // Session
            start_dwell: START_DWELL,
            game_over_flash: GAME_OVER_FLASH,
            // Sampling thread
            sampler_idle_ms: SAMPLER_IDLE_MS,
            sensor_retry_ms: SENSOR_RETRY_MS,
            sampler_shutdown_timeout: SAMPLER_SHUTDOWN_TIMEOUT,
            sensor_cadence_ms: SENSOR_CADENCE_MS,
            // Persistence / Rendering
            high_score_path: HIGH_SCORE_PATH.to_string(),
            hud_font_size: HUD_FONT_SIZE,
        }
    }
}

impl GameConfig {
    /// Parse a TOML document, keeping defaults for missing keys, and validate it.
    pub fn from_toml_str(contents: &str) -> GameResult<Self> {
        let config: GameConfig = toml::from_str(contents).map_err(|err| GameError::ConfigParse {
            reason: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file is missing or bad.
    ///
    /// Never fails: a broken config must not keep the game from starting.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(loaded) => {
                    info!("Loaded game config from {}", path.display());
                    loaded
                }
                Err(err) => {
                    warn!("Rejected {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                info!("No {} found; using compiled defaults", path.display());
                Self::default()
            }
        }
    }

    /// Reject values that would break chain, smoother or placement invariants.
    pub fn validate(&self) -> GameResult<()> {
        validate_positive("GAME_WIDTH", self.game_width)?;
        validate_positive("GAME_HEIGHT", self.game_height)?;
        validate_positive("TICK_HZ", self.tick_hz as f32)?;
        validate_positive("CAMERA_WIDTH", self.camera_width)?;
        validate_positive("CAMERA_HEIGHT", self.camera_height)?;
        validate_positive("SEGMENT_SIZE", self.segment_size)?;
        validate_positive("SEGMENT_SPACING", self.segment_spacing)?;
        validate_at_least("INITIAL_LENGTH", self.initial_length, 2)?;
        validate_non_negative("MIN_MOVE_DISTANCE", self.min_move_distance)?;
        validate_positive("MAX_SPEED", self.max_speed)?;
        validate_positive("BOOST_MULTIPLIER", self.boost_multiplier)?;
        validate_retention("VELOCITY_INERTIA", self.velocity_inertia)?;
        validate_positive("EASE_DISTANCE", self.ease_distance)?;
        validate_positive("COLLISION_THRESHOLD", self.collision_threshold)?;
        validate_at_least(
            "SELF_COLLISION_IGNORE",
            self.self_collision_ignore as u32,
            1,
        )?;
        validate_non_negative("WALL_COLLISION_MARGIN", self.wall_collision_margin)?;
        validate_at_least("SMOOTHING_WINDOW", self.smoothing_window as u32, 1)?;
        validate_unit_interval("SMOOTHING_FACTOR", self.smoothing_factor)?;
        validate_positive("JUMP_THRESHOLD", self.jump_threshold)?;
        validate_positive("FOOD_SIZE", self.food_size)?;
        validate_positive("BONUS_FOOD_SIZE", self.bonus_food_size)?;
        validate_non_negative("FOOD_SPAWN_MARGIN", self.food_spawn_margin)?;
        if self.food_spawn_margin * 2.0 > self.game_width.min(self.game_height) {
            return Err(GameError::UnsafeConstant {
                name: "FOOD_SPAWN_MARGIN",
                value: self.food_spawn_margin,
                safe_range: "[0.0, min(GAME_WIDTH, GAME_HEIGHT) / 2]",
            });
        }
        validate_at_least("SPAWN_ATTEMPTS", self.spawn_attempts, 1)?;
        validate_non_negative("REGULAR_COOLDOWN", self.regular_cooldown)?;
        validate_non_negative("BONUS_BOOST_DURATION", self.bonus_boost_duration)?;
        validate_non_negative("BONUS_INTERVAL_MIN", self.bonus_interval_min)?;
        if self.bonus_interval_max < self.bonus_interval_min {
            return Err(GameError::UnsafeConstant {
                name: "BONUS_INTERVAL_MAX",
                value: self.bonus_interval_max,
                safe_range: "[BONUS_INTERVAL_MIN, ∞)",
            });
        }
        validate_non_negative("START_DWELL", self.start_dwell)?;
        validate_positive("SAMPLER_SHUTDOWN_TIMEOUT", self.sampler_shutdown_timeout)?;
        Ok(())
    }
}
