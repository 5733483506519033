//! Uniform read-only interface over one liquidity venue.
//!
//! Each venue's HTTP/WebSocket plumbing lives outside this core; an
//! implementation of [`MarketPriceSource`] is injected per venue. All
//! calls are blocking and synchronous; retry/backoff belongs to the
//! implementation, not to the callers here.

use flexmm_core::{OrderBook, Ticker, TradingPair};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors a venue client can report.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("venue error: {0}")]
    Venue(String),

    #[error("market not listed: {0}")]
    UnknownMarket(String),
}

/// Read-only market-data queries against one venue.
#[cfg_attr(test, mockall::automock)]
pub trait MarketPriceSource {
    /// Best bid and ask from ticker data. A missing side comes back as
    /// a zero price.
    fn ticker_prices(&self, pair: &TradingPair) -> Result<Ticker, SourceError>;

    /// Full order book snapshot, bids descending / asks ascending.
    fn orderbook(&self, pair: &TradingPair) -> Result<OrderBook, SourceError>;

    /// Trading fee for the market, as a fraction of 1.
    fn market_fee(&self, pair: &TradingPair) -> Result<Decimal, SourceError>;
}
