//! Center price with provenance.

use crate::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a center price came from.
///
/// Provenance is carried for logging only; downstream math never
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Depth-weighted price of the own market's book.
    Direct,
    /// Combined through an intermediate asset across two markets.
    Derived,
    /// External price feed.
    External,
    /// Price of the strategy's own most recent fill.
    LastTrade,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Derived => write!(f, "derived"),
            Self::External => write!(f, "external"),
            Self::LastTrade => write!(f, "last-trade"),
        }
    }
}

/// A positive reference price around which the ladder is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterPrice {
    pub price: Price,
    pub provenance: Provenance,
}

impl CenterPrice {
    pub fn new(price: Price, provenance: Provenance) -> Self {
        Self { price, provenance }
    }
}

impl fmt::Display for CenterPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.price, self.provenance)
    }
}
