//! Market identification types.
//!
//! A market is an ordered pair of asset symbols, `QUOTE/BASE`. Symbols
//! arriving from DEX gateways carry issuer prefixes (`BRIDGE.BTC`,
//! `OPEN.LTC`); those are stripped on construction so the same pair can
//! be looked up on any external venue.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized asset symbol.
///
/// Upper-cased, with any gateway prefix stripped (`BRIDGE.BTC` -> `BTC`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol, stripping gateway prefixes and upper-casing.
    pub fn new(raw: &str) -> Result<Self> {
        let stripped = match raw.rsplit_once('.') {
            Some((_, suffix)) => suffix,
            None => raw,
        };
        let normalized = stripped.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::InvalidSymbol(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Ordered market pair `QUOTE/BASE`.
///
/// Immutable once constructed. Parsing accepts `/`, `:` or `-` as the
/// pair separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    quote: Symbol,
    base: Symbol,
}

impl TradingPair {
    pub fn new(quote: Symbol, base: Symbol) -> Self {
        Self { quote, base }
    }

    pub fn quote(&self) -> &Symbol {
        &self.quote
    }

    pub fn base(&self) -> &Symbol {
        &self.base
    }

    /// Derive the two markets that connect this pair through an
    /// intermediate asset: `QUOTE/I` and either `I/BASE` or, when
    /// `invert` is set, `BASE/I` (most CEXs only list fixed bases like
    /// BTC or USD, so the second leg is usually queried inverted).
    pub fn derived_markets(&self, intermediate: &Symbol, invert: bool) -> (TradingPair, TradingPair) {
        let market1 = TradingPair::new(self.quote.clone(), intermediate.clone());
        let market2 = if invert {
            TradingPair::new(self.base.clone(), intermediate.clone())
        } else {
            TradingPair::new(intermediate.clone(), self.base.clone())
        };
        (market1, market2)
    }

    /// True if the intermediate asset is already one of the pair legs,
    /// in which case no derivation is needed.
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.quote == *symbol || self.base == *symbol
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.quote, self.base)
    }
}

impl FromStr for TradingPair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.splitn(2, ['/', ':', '-']).collect();
        match parts.as_slice() {
            [quote, base] => Ok(Self::new(Symbol::new(quote)?, Symbol::new(base)?)),
            _ => Err(CoreError::InvalidPair(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_strips_gateway_prefix() {
        assert_eq!(Symbol::new("BRIDGE.BTC").unwrap().as_str(), "BTC");
        assert_eq!(Symbol::new("OPEN.LTC").unwrap().as_str(), "LTC");
        assert_eq!(Symbol::new("bts").unwrap().as_str(), "BTS");
        assert!(Symbol::new("").is_err());
    }

    #[test]
    fn test_pair_parses_all_separators() {
        for raw in ["LTC/BTS", "LTC:BTS", "LTC-BTS"] {
            let pair: TradingPair = raw.parse().unwrap();
            assert_eq!(pair.quote().as_str(), "LTC");
            assert_eq!(pair.base().as_str(), "BTS");
        }
        assert!("LTCBTS".parse::<TradingPair>().is_err());
    }

    #[test]
    fn test_pair_normalizes_legs() {
        let pair: TradingPair = "BRIDGE.BTC/bts".parse().unwrap();
        assert_eq!(pair.to_string(), "BTC/BTS");
    }

    #[test]
    fn test_derived_markets() {
        let pair: TradingPair = "LTC/BTS".parse().unwrap();
        let btc = Symbol::new("BTC").unwrap();

        let (m1, m2) = pair.derived_markets(&btc, true);
        assert_eq!(m1.to_string(), "LTC/BTC");
        assert_eq!(m2.to_string(), "BTS/BTC");

        let (m1, m2) = pair.derived_markets(&btc, false);
        assert_eq!(m1.to_string(), "LTC/BTC");
        assert_eq!(m2.to_string(), "BTC/BTS");
    }

    #[test]
    fn test_pair_contains() {
        let pair: TradingPair = "LTC/BTC".parse().unwrap();
        assert!(pair.contains(&Symbol::new("BTC").unwrap()));
        assert!(!pair.contains(&Symbol::new("BTS").unwrap()));
    }
}
