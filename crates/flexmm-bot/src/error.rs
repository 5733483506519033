//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Market error: {0}")]
    Core(#[from] flexmm_core::CoreError),

    #[error("Strategy error: {0}")]
    Ladder(#[from] flexmm_ladder::LadderError),

    #[error("Strategy configuration error: {0}")]
    Strategy(#[from] flexmm_ladder::ConfigError),

    #[error("State error: {0}")]
    State(#[from] flexmm_state::StateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
