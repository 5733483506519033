//! Prioritized center-price discovery.
//!
//! Chains the competing price sources in a fixed priority order:
//! external feed (with internal cross-market derivation), own last
//! trade, and finally the own market's depth-weighted price. Every step
//! reports `Unavailable` explicitly instead of a numeric sentinel.

use flexmm_core::{CenterPrice, Provenance, Size, Symbol, Trade, TradingPair};
use tracing::{info, warn};

use crate::center::{derived_center_price, market_center_price};
use crate::error::{PricingError, Result};
use crate::source::{MarketPriceSource, SourceError};

/// Computes a single trustworthy center price for one market.
pub struct PriceDiscoveryEngine {
    pair: TradingPair,
    own: Box<dyn MarketPriceSource>,
    external: Option<Box<dyn MarketPriceSource>>,
    /// QUOTE depth for the own-market walk; `None` means top of book.
    depth: Option<Size>,
    use_last_trade: bool,
    intermediate: Symbol,
}

impl PriceDiscoveryEngine {
    pub fn new(pair: TradingPair, own: Box<dyn MarketPriceSource>, intermediate: Symbol) -> Self {
        Self {
            pair,
            own,
            external: None,
            depth: None,
            use_last_trade: false,
            intermediate,
        }
    }

    /// Prefer the given external feed over all other sources.
    pub fn with_external(mut self, source: Box<dyn MarketPriceSource>) -> Self {
        self.external = Some(source);
        self
    }

    /// Measure the own-market price at this QUOTE depth instead of the
    /// top of book.
    pub fn with_depth(mut self, depth: Size) -> Self {
        self.depth = (!depth.is_zero()).then_some(depth);
        self
    }

    /// Prefer the own last-trade price once the ladder has bootstrapped.
    pub fn with_last_trade(mut self, enabled: bool) -> Self {
        self.use_last_trade = enabled;
        self
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    /// Compute the center price, walking the fallback chain.
    ///
    /// `bootstrapped` gates the last-trade mode (a fresh strategy has no
    /// own fills worth trusting); `last_trade` is the caller's most
    /// recent own fill, if any. An external feed, when configured, is
    /// authoritative: its failure is reported, not silently replaced by
    /// the own-market price.
    pub fn center_price(
        &self,
        bootstrapped: bool,
        last_trade: Option<&Trade>,
    ) -> Result<CenterPrice> {
        if let Some(external) = &self.external {
            let center = self.external_center(external.as_ref())?;
            info!(market = %self.pair, %center, "using center price from external source");
            return Ok(center);
        }

        if self.use_last_trade && bootstrapped {
            if let Some(trade) = last_trade.filter(|t| t.price.is_positive()) {
                let center = CenterPrice::new(trade.price, Provenance::LastTrade);
                info!(market = %self.pair, %center, "using center price from last trade");
                return Ok(center);
            }
            // No usable fill yet, fall through to the market price.
            warn!(market = %self.pair, "no last trade available, falling back to market price");
        }

        let price = market_center_price(self.own.as_ref(), &self.pair, self.depth)?;
        let center = CenterPrice::new(price, Provenance::Direct);
        info!(market = %self.pair, %center, "using market center price");
        Ok(center)
    }

    /// Direct quote from the external feed, falling back to derivation
    /// through the intermediate asset when the pair is not listed.
    /// External feeds are queried at top of book; the configured depth
    /// only applies to the own market.
    fn external_center(&self, source: &dyn MarketPriceSource) -> Result<CenterPrice> {
        match market_center_price(source, &self.pair, None) {
            Ok(price) => Ok(CenterPrice::new(price, Provenance::External)),
            Err(e) if derivation_applies(&e) => {
                let price = derived_center_price(source, &self.pair, &self.intermediate, None)?;
                Ok(CenterPrice::new(price, Provenance::Derived))
            }
            Err(e) => Err(e),
        }
    }
}

/// Direct-quote failures that justify trying cross-market derivation:
/// the pair is missing or empty on the venue. Hard venue errors
/// propagate untouched.
fn derivation_applies(err: &PricingError) -> bool {
    match err {
        PricingError::Unavailable { .. } => true,
        PricingError::Source(SourceError::UnknownMarket(_)) => true,
        PricingError::Source(SourceError::Venue(_)) => false,
    }
}
