//! Core domain types for the flexmm market-making bot.
//!
//! This crate provides the fundamental types used throughout the system:
//! - `TradingPair`, `Symbol`: normalized market identifiers
//! - `Price`, `Size`: precision-safe numeric types
//! - `OrderBook`, `Ticker`: venue market-data snapshots
//! - `Order`, `Trade`, `OrderSide`: account-level trading types
//! - `CenterPrice`: a priced reference point tagged with its provenance

pub mod book;
pub mod decimal;
pub mod error;
pub mod market;
pub mod order;
pub mod price;

pub use book::{OrderBook, OrderBookLevel, Ticker};
pub use decimal::{decimal_sqrt, Price, Size};
pub use error::{CoreError, Result};
pub use market::{Symbol, TradingPair};
pub use order::{Order, OrderId, OrderSide, Trade};
pub use price::{CenterPrice, Provenance};
