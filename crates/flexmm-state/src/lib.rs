//! Strategy state persistence for the flexmm bot.
//!
//! Each worker instance persists two fields across restarts: the last
//! accepted center price and whether the ladder has ever bootstrapped.
//! The store is a small key-value collaborator scoped per worker name.

pub mod error;
pub mod store;

pub use error::{StateError, StateResult};
pub use store::{JsonFileStore, StateStore, StrategyState};
