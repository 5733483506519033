//! Order book and ticker market-data types.
//!
//! Books are kept in the ccxt convention: level quantities are QUOTE
//! amounts, bids sorted best-first (descending price), asks best-first
//! (ascending price).

use crate::{Price, Size};
use serde::{Deserialize, Serialize};

/// One order book level: price and available QUOTE quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookLevel {
    pub price: Price,
    pub quantity: Size,
}

impl OrderBookLevel {
    pub fn new(price: Price, quantity: Size) -> Self {
        Self { price, quantity }
    }

    /// BASE amount represented by this level: quantity * price.
    pub fn base_amount(&self) -> rust_decimal::Decimal {
        self.quantity.notional(self.price)
    }
}

/// Two-sided order book snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Bids sorted best-first (descending price).
    pub bids: Vec<OrderBookLevel>,
    /// Asks sorted best-first (ascending price).
    pub asks: Vec<OrderBookLevel>,
}

impl OrderBook {
    pub fn new(bids: Vec<OrderBookLevel>, asks: Vec<OrderBookLevel>) -> Self {
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Best bid and ask from venue ticker data.
///
/// A missing side is reported as a zero price by most venue clients;
/// `has_bid`/`has_ask` make that judgment explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub bid: Price,
    pub ask: Price,
}

impl Ticker {
    pub fn new(bid: Price, ask: Price) -> Self {
        Self { bid, ask }
    }

    pub fn has_bid(&self) -> bool {
        self.bid.is_positive()
    }

    pub fn has_ask(&self) -> bool {
        self.ask.is_positive()
    }
}
