//! Service configuration
//!
//! Values resolve in priority order: command-line flag, then environment
//! variable (both via clap), then TOML config file, then compiled default.

use rollcall_common::{Error, Result, TimeWindow};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Telegram delivery credentials
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// Full service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port for the scan endpoint
    pub port: u16,
    /// Directory of reference images, one per identity
    pub roster_dir: PathBuf,
    /// Path of the attendance ledger file
    pub ledger_path: PathBuf,
    /// Resolver accept threshold (normalized distance, lower is stricter)
    pub match_threshold: f64,
    /// Daily attendance window
    pub window: TimeWindow,
    /// Report delivery channel; dispatch is a logged no-op when absent
    pub telegram: Option<TelegramConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            roster_dir: PathBuf::from("image_folder"),
            ledger_path: PathBuf::from("Attendance.csv"),
            match_threshold: 0.25,
            window: TimeWindow::default(),
            telegram: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, or defaults when no file given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}
