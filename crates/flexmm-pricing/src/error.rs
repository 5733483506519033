//! Pricing error types.
//!
//! `Unavailable` is a tagged sentinel, never a numeric zero: callers can
//! always distinguish "price is legitimately low" from "no data".

use crate::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("No price available for {market}: {reason}")]
    Unavailable { market: String, reason: String },

    #[error("Price source error: {0}")]
    Source(#[from] SourceError),
}

impl PricingError {
    pub fn unavailable(market: impl ToString, reason: impl ToString) -> Self {
        Self::Unavailable {
            market: market.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Result type alias for pricing operations.
pub type Result<T> = std::result::Result<T, PricingError>;
