//! Strategy state and the file-backed store.

use std::fs;
use std::path::{Path, PathBuf};

use flexmm_core::Price;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateResult;

/// Persisted per-worker strategy state.
///
/// Created empty on first run, updated only after a successful ladder
/// placement, survives process restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyState {
    /// Last accepted center price, if any.
    pub center_price: Option<Price>,
    /// Whether a full ladder has ever been placed.
    pub bootstrapped: bool,
}

/// Key-value persistence collaborator, scoped per worker instance.
pub trait StateStore {
    /// Load the stored state. `None` on first run.
    fn load(&self) -> StateResult<Option<StrategyState>>;

    /// Persist the given state.
    fn save(&self, state: &StrategyState) -> StateResult<()>;
}

/// One JSON file per worker under a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store for `worker_name`, kept at `<data_dir>/<worker_name>.json`.
    pub fn new(data_dir: &Path, worker_name: &str) -> Self {
        Self {
            path: data_dir.join(format!("{worker_name}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> StateResult<Option<StrategyState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw)?;
        debug!(path = %self.path.display(), ?state, "loaded strategy state");
        Ok(Some(state))
    }

    fn save(&self, state: &StrategyState) -> StateResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(state)?)?;
        debug!(path = %self.path.display(), ?state, "saved strategy state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), "worker-a");
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path(), "worker-a");

        let state = StrategyState {
            center_price: Some(Price::new(dec!(1.2345))),
            bootstrapped: true,
        };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn test_workers_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let a = JsonFileStore::new(dir.path(), "worker-a");
        let b = JsonFileStore::new(dir.path(), "worker-b");

        a.save(&StrategyState {
            center_price: None,
            bootstrapped: true,
        })
        .unwrap();
        assert_eq!(b.load().unwrap(), None);
    }
}
