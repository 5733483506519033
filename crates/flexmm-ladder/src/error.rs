//! Ladder error types.

use crate::account::AccountError;
use thiserror::Error;

/// Configuration errors, raised once at strategy construction.
///
/// Never silently corrected: a malformed worker config stops that
/// worker before it can trade.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid percentage list {list:?}: {reason}")]
    InvalidPercentages { list: String, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(transparent)]
    Core(#[from] flexmm_core::CoreError),
}

impl ConfigError {
    pub fn percentages(list: &str, reason: impl ToString) -> Self {
        Self::InvalidPercentages {
            list: list.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn value(field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.to_string(),
        }
    }
}

/// Errors surfaced from a maintenance pass.
///
/// Price-unavailable conditions are handled inside the controller
/// (cancel everything, skip the pass) and never appear here.
#[derive(Debug, Error)]
pub enum LadderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("State error: {0}")]
    State(#[from] flexmm_state::StateError),
}

pub type Result<T> = std::result::Result<T, LadderError>;
