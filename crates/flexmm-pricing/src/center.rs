//! Market center price, spread, and cross-market derivation.

use flexmm_core::{decimal_sqrt, Price, Size, Symbol, TradingPair};
use rust_decimal::Decimal;
use tracing::debug;

use crate::depth::{market_buy_price, market_sell_price, DepthTarget};
use crate::error::{PricingError, Result};
use crate::source::MarketPriceSource;

/// Center price of a market: the geometric mean of the depth-weighted
/// buy and sell prices, `buy * sqrt(sell / buy)`.
///
/// `depth` is a QUOTE amount; `None` or zero measures the top of book
/// via ticker data. A missing bid or ask is reported as
/// [`PricingError::Unavailable`], never as a zero price.
pub fn market_center_price(
    source: &dyn MarketPriceSource,
    pair: &TradingPair,
    depth: Option<Size>,
) -> Result<Price> {
    let depth = depth.filter(|d| d.is_positive());

    let (buy_price, sell_price) = match depth {
        None => {
            let ticker = source.ticker_prices(pair)?;
            (ticker.bid, ticker.ask)
        }
        Some(amount) => {
            // Fetch the book once and share it between both walks.
            let book = source.orderbook(pair)?;
            let target = Some(DepthTarget::Quote(amount));
            let buy = market_buy_price(source, pair, target, Some(&book))?;
            let sell = market_sell_price(source, pair, target, Some(&book))?;
            (buy, sell)
        }
    };

    if !buy_price.is_positive() {
        return Err(PricingError::unavailable(pair, "there is no highest bid"));
    }
    if !sell_price.is_positive() {
        return Err(PricingError::unavailable(pair, "there is no lowest ask"));
    }

    let center = buy_price.inner() * decimal_sqrt(sell_price.inner() / buy_price.inner());
    debug!(market = %pair, %buy_price, %sell_price, %center, "market center price");
    Ok(Price::new(center))
}

/// Market spread `ask / bid - 1` at the given QUOTE depth.
pub fn market_spread(
    source: &dyn MarketPriceSource,
    pair: &TradingPair,
    depth: Option<Size>,
) -> Result<Decimal> {
    let depth = depth.filter(|d| d.is_positive());

    let (bid, ask) = match depth {
        None => {
            let ticker = source.ticker_prices(pair)?;
            (ticker.bid, ticker.ask)
        }
        Some(amount) => {
            let book = source.orderbook(pair)?;
            let target = Some(DepthTarget::Quote(amount));
            let bid = market_buy_price(source, pair, target, Some(&book))?;
            let ask = market_sell_price(source, pair, target, Some(&book))?;
            (bid, ask)
        }
    };

    if !bid.is_positive() || !ask.is_positive() {
        return Err(PricingError::unavailable(pair, "book side empty"));
    }

    Ok(ask.inner() / bid.inner() - Decimal::ONE)
}

/// Center price of an indirect market, derived through an intermediate
/// asset: `QUOTE/BASE` is obtained from `QUOTE/I` and `BASE/I` as
/// `price1 / price2` (the second leg is queried inverted because most
/// venues only list fixed bases like BTC or USD).
///
/// If the intermediate asset is already one of the pair legs the direct
/// market price is returned. Either leg unavailable makes the whole
/// derivation unavailable; a partial result is never returned.
pub fn derived_center_price(
    source: &dyn MarketPriceSource,
    pair: &TradingPair,
    intermediate: &Symbol,
    depth: Option<Size>,
) -> Result<Price> {
    if pair.contains(intermediate) {
        return market_center_price(source, pair, depth);
    }

    let (market1, market2) = pair.derived_markets(intermediate, true);

    let price1 = market_center_price(source, &market1, depth)
        .map_err(|e| leg_unavailable(pair, &market1, e))?;
    let price2 = market_center_price(source, &market2, depth)
        .map_err(|e| leg_unavailable(pair, &market2, e))?;

    // Division because the second leg is inverted.
    let center = price1.inner() / price2.inner();
    debug!(market = %pair, %price1, %price2, %center, "derived center price");
    Ok(Price::new(center))
}

fn leg_unavailable(pair: &TradingPair, leg: &TradingPair, err: PricingError) -> PricingError {
    match err {
        PricingError::Unavailable { .. } => {
            PricingError::unavailable(pair, format!("derivation leg {leg} unavailable"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MockMarketPriceSource, SourceError};
    use flexmm_core::{OrderBook, OrderBookLevel, Ticker};
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        "LTC/BTS".parse().unwrap()
    }

    fn ticker_source(bid: Decimal, ask: Decimal) -> MockMarketPriceSource {
        let mut source = MockMarketPriceSource::new();
        source
            .expect_ticker_prices()
            .returning(move |_| Ok(Ticker::new(Price::new(bid), Price::new(ask))));
        source
    }

    #[test]
    fn test_center_is_geometric_mean() {
        let source = ticker_source(dec!(4), dec!(9));
        let center = market_center_price(&source, &pair(), None).unwrap();
        // 4 * sqrt(9/4) = 6
        assert_eq!(center.inner(), dec!(6));
    }

    #[test]
    fn test_zero_bid_is_unavailable_not_zero() {
        let source = ticker_source(dec!(0), dec!(9));
        let err = market_center_price(&source, &pair(), None).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_zero_ask_is_unavailable() {
        let source = ticker_source(dec!(4), dec!(0));
        let err = market_center_price(&source, &pair(), None).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_depth_walk_center() {
        let book = OrderBook::new(
            vec![OrderBookLevel::new(Price::new(dec!(4)), Size::new(dec!(100)))],
            vec![OrderBookLevel::new(Price::new(dec!(9)), Size::new(dec!(100)))],
        );
        let mut source = MockMarketPriceSource::new();
        source.expect_orderbook().returning(move |_| Ok(book.clone()));
        source.expect_market_fee().returning(|_| Ok(dec!(0)));

        let center = market_center_price(&source, &pair(), Some(Size::new(dec!(10)))).unwrap();
        assert_eq!(center.inner(), dec!(6));
    }

    #[test]
    fn test_derived_price_combines_legs() {
        let mut source = MockMarketPriceSource::new();
        source.expect_ticker_prices().returning(|p| {
            // LTC/BTC at 0.004, BTS/BTC at 0.002 -> LTC/BTS = 2
            if p.quote().as_str() == "LTC" {
                Ok(Ticker::new(Price::new(dec!(0.004)), Price::new(dec!(0.004))))
            } else {
                Ok(Ticker::new(Price::new(dec!(0.002)), Price::new(dec!(0.002))))
            }
        });

        let btc = Symbol::new("BTC").unwrap();
        let price = derived_center_price(&source, &pair(), &btc, None).unwrap();
        assert_eq!(price.inner(), dec!(2));
    }

    #[test]
    fn test_derived_price_direct_when_intermediate_is_leg() {
        let source = ticker_source(dec!(4), dec!(9));
        let ltc = Symbol::new("LTC").unwrap();
        let price = derived_center_price(&source, &pair(), &ltc, None).unwrap();
        assert_eq!(price.inner(), dec!(6));
    }

    #[test]
    fn test_derived_price_fails_when_leg_missing() {
        let mut source = MockMarketPriceSource::new();
        source.expect_ticker_prices().returning(|p| {
            if p.quote().as_str() == "LTC" {
                Ok(Ticker::new(Price::new(dec!(0.004)), Price::new(dec!(0.004))))
            } else {
                // Second leg has no market
                Err(SourceError::UnknownMarket(p.to_string()))
            }
        });

        let btc = Symbol::new("BTC").unwrap();
        let err = derived_center_price(&source, &pair(), &btc, None).unwrap_err();
        // Source errors propagate undimmed
        assert!(matches!(err, PricingError::Source(_)));
    }

    #[test]
    fn test_derived_price_leg_unavailable_taints_whole() {
        let mut source = MockMarketPriceSource::new();
        source.expect_ticker_prices().returning(|p| {
            if p.quote().as_str() == "LTC" {
                Ok(Ticker::new(Price::new(dec!(0.004)), Price::new(dec!(0.004))))
            } else {
                // Listed but empty book
                Ok(Ticker::new(Price::ZERO, Price::ZERO))
            }
        });

        let btc = Symbol::new("BTC").unwrap();
        let err = derived_center_price(&source, &pair(), &btc, None).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_market_spread() {
        let source = ticker_source(dec!(100), dec!(102));
        let spread = market_spread(&source, &pair(), None).unwrap();
        assert_eq!(spread, dec!(0.02));
    }

    #[test]
    fn test_market_spread_unavailable_on_empty_side() {
        let source = ticker_source(dec!(100), dec!(0));
        assert!(market_spread(&source, &pair(), None).unwrap_err().is_unavailable());
    }
}
