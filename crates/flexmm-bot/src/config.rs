//! Application configuration.
//!
//! One TOML file per deployment. Each `[workers.<name>]` table binds a
//! market to a ladder strategy; strategy knobs not given fall back to
//! their defaults.

use std::collections::BTreeMap;
use std::path::Path;

use flexmm_ladder::LadderSettings;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_tick_interval_ms() -> u64 {
    2_000
}

/// Per-worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Market the worker trades, e.g. "LTC/BTS".
    pub market: String,
    /// Ladder strategy settings; every field has a default.
    #[serde(default)]
    pub strategy: LadderSettings,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for per-worker persisted state.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Timer tick period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Workers keyed by name; ordered so startup is deterministic.
    #[serde(default)]
    pub workers: BTreeMap<String, WorkerConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tick_interval_ms: default_tick_interval_ms(),
            workers: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or fall back to defaults when the file does
    /// not exist.
    pub fn load_or_default(path: &str) -> AppResult<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
