//! Order book / account collaborator contract.
//!
//! Signing, broadcast, and wallet management live behind this trait.
//! Calls are blocking and synchronous; the implementation owns retries.

use std::collections::HashMap;

use flexmm_core::{Order, OrderId, Price, Size, Symbol, Trade};
use thiserror::Error;

/// Errors the account collaborator can report.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("venue error: {0}")]
    Venue(String),

    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
}

/// Account-level operations on the own market.
///
/// `place_buy_order`/`place_sell_order` return `Ok(None)` when the
/// order matched immediately and the venue assigned no resting id;
/// callers treat that as a fill, not a failure.
#[cfg_attr(test, mockall::automock)]
pub trait AccountClient {
    /// All own open orders on this market, keyed by order id.
    fn own_orders(&self) -> Result<HashMap<OrderId, Order>, AccountError>;

    /// Refresh a single order. `None` if it no longer exists.
    fn order(&self, id: &OrderId) -> Result<Option<Order>, AccountError>;

    /// Cancel every own open order on this market.
    fn cancel_all_orders(&mut self) -> Result<(), AccountError>;

    /// Place a limit buy for `quote_amount` QUOTE at `price`.
    fn place_buy_order(
        &mut self,
        quote_amount: Size,
        price: Price,
    ) -> Result<Option<Order>, AccountError>;

    /// Place a limit sell for `quote_amount` QUOTE at `price`.
    fn place_sell_order(
        &mut self,
        quote_amount: Size,
        price: Price,
    ) -> Result<Option<Order>, AccountError>;

    /// Free balance of the given asset.
    fn balance(&self, asset: &Symbol) -> Result<Size, AccountError>;

    /// Most recent own fill on this market, if any.
    fn last_own_trade(&self) -> Result<Option<Trade>, AccountError>;
}
