//! Game-specific error types.
//!
//! Core components propagate failures through [`GameError`] rather than
//! panicking, so a bad config file, a missing camera frame, or an unwritable
//! high-score file degrade gracefully instead of halting the tick.

use std::fmt;

/// Top-level error enum for the finger-snake core.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// The sensor collaborator produced no frame this iteration.
    /// The sampling loop skips the iteration and retries.
    SensorRead {
        /// Human-readable description from the sensor.
        reason: String,
    },

    /// The configuration text could not be parsed.
    ConfigParse {
        /// Parser message.
        reason: String,
    },

    /// A configuration constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// Reading or writing the high-score file failed.
    HighScoreIo {
        /// File that was accessed.
        path: String,
        /// Underlying I/O or parse message.
        reason: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::SensorRead { reason } => write!(f, "sensor produced no frame: {}", reason),
            GameError::ConfigParse { reason } => write!(f, "failed to parse config: {}", reason),
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            GameError::HighScoreIo { path, reason } => {
                write!(f, "high score file '{}': {}", path, reason)
            }
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive and finite.
pub fn validate_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` is finite and not negative.
pub fn validate_non_negative(name: &'static str, value: f32) -> GameResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error unless `value` lies in `(0.0, 1.0]`.
///
/// Used for the exponential smoothing factor: α = 0 would freeze the output.
pub fn validate_unit_interval(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, 1.0]",
        })
    }
}

/// Returns an error unless `value` lies in `[0.0, 1.0)`.
///
/// Used for velocity inertia: 1.0 would never pick up the desired velocity.
pub fn validate_retention(name: &'static str, value: f32) -> GameResult<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0)",
        })
    }
}

/// Returns an error if an integral count is below `min`.
pub fn validate_at_least(name: &'static str, value: u32, min: u32) -> GameResult<()> {
    if value >= min {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value: value as f32,
            safe_range: if min <= 1 { "[1, ∞)" } else { "[2, ∞)" },
        })
    }
}
