//! Center-price discovery for the flexmm bot.
//!
//! Provides the uniform [`MarketPriceSource`] interface over liquidity
//! venues, depth-weighted order-book price math, cross-market price
//! derivation through an intermediate asset, and the
//! [`PriceDiscoveryEngine`] that chains all of it into a prioritized
//! fallback protocol.

pub mod center;
pub mod depth;
pub mod engine;
pub mod error;
pub mod source;

pub use center::{derived_center_price, market_center_price, market_spread};
pub use depth::{market_buy_price, market_sell_price, DepthTarget};
pub use engine::PriceDiscoveryEngine;
pub use error::{PricingError, Result};
pub use source::{MarketPriceSource, SourceError};
