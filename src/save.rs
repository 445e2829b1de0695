use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

const SAVE_VERSION: u32 = 1;

/// On-disk high score record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighScoreRecord {
    #[serde(default = "default_version")]
    pub version: u32,
    pub high_score: u32,
    #[serde(default)]
    pub saved_at_unix: u64,
}

fn default_version() -> u32 {
    SAVE_VERSION
}

/// Best score persisted as a small TOML file.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> GameResult<u32> {
        let contents = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let record: HighScoreRecord =
            toml::from_str(&contents).map_err(|err| self.io_error(err))?;
        if record.version > SAVE_VERSION {
            return Err(self.io_error(format!(
                "unsupported high score version {}",
                record.version
            )));
        }
        Ok(record.high_score)
    }

    /// Any failure reads as "no high score yet".
    pub fn load_or_zero(&self) -> u32 {
        match self.load() {
            Ok(score) => {
                info!("Loaded high score {score} from {}", self.path.display());
                score
            }
            Err(err) => {
                if self.path.exists() {
                    warn!("{err}; starting from 0");
                } else {
                    info!("No high score at {}; starting from 0", self.path.display());
                }
                0
            }
        }
    }

    pub fn save(&self, high_score: u32) -> GameResult<()> {
        let record = HighScoreRecord {
            version: SAVE_VERSION,
            high_score,
            saved_at_unix: current_unix_timestamp(),
        };
        let serialized = toml::to_string_pretty(&record).map_err(|err| self.io_error(err))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| self.io_error(err))?;
        }
        fs::write(&self.path, serialized).map_err(|err| self.io_error(err))
    }

    fn io_error(&self, reason: impl ToString) -> GameError {
        GameError::HighScoreIo {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
