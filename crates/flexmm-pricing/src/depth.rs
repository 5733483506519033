//! Depth-weighted execution price math.
//!
//! Walks one side of an order book from the best price outward,
//! consuming levels until a target amount is reached, and reports the
//! average execution price `sum_base / sum_quote`. A zero result means
//! "no liquidity"; callers turn that into an explicit unavailable.

use flexmm_core::{OrderBook, OrderBookLevel, Price, Size, TradingPair};
use rust_decimal::Decimal;

use crate::error::Result;
use crate::source::MarketPriceSource;

/// Which asset the depth target is measured in.
///
/// The buy path conventionally measures BASE, the sell path QUOTE; the
/// enum makes the choice explicit at every call site instead of
/// inferring precedence from which optional argument is larger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTarget {
    Base(Size),
    Quote(Size),
}

impl DepthTarget {
    pub fn amount(&self) -> Size {
        match self {
            Self::Base(a) | Self::Quote(a) => *a,
        }
    }

    fn scaled(&self, factor: Decimal) -> Self {
        match self {
            Self::Base(a) => Self::Base(*a * factor),
            Self::Quote(a) => Self::Quote(*a * factor),
        }
    }
}

/// Accumulate BASE and QUOTE amounts for `target` worth of book depth.
///
/// Each level is consumed fully if it fits into the remaining target,
/// otherwise fractionally so the accumulated target amount equals the
/// target exactly. Returns `(sum_base, sum_quote)`.
fn sum_amounts(target: &DepthTarget, levels: &[OrderBookLevel]) -> (Decimal, Decimal) {
    let mut sum_base = Decimal::ZERO;
    let mut sum_quote = Decimal::ZERO;
    let mut missing = target.amount().inner();

    for level in levels {
        let order_quote = level.quantity.inner();
        let order_base = level.base_amount();
        match target {
            DepthTarget::Base(_) => {
                if order_base <= missing {
                    sum_quote += order_quote;
                    sum_base += order_base;
                    missing -= order_base;
                } else {
                    sum_quote += missing / level.price.inner();
                    sum_base += missing;
                    break;
                }
            }
            DepthTarget::Quote(_) => {
                if order_quote <= missing {
                    sum_quote += order_quote;
                    sum_base += order_base;
                    missing -= order_quote;
                } else {
                    sum_quote += missing;
                    sum_base += missing * level.price.inner();
                    break;
                }
            }
        }
    }

    (sum_base, sum_quote)
}

/// Average price at which `depth` worth of QUOTE could be sold into the
/// bids (the best attainable "buy price" of the market for that depth).
///
/// With no depth (or a zero depth) the ticker's best bid is returned
/// instead of walking the book. The target is inflated by the market fee
/// so the measured depth matches what an order would actually consume.
/// Returns `Price::ZERO` when the book cannot cover the target.
pub fn market_buy_price(
    source: &dyn MarketPriceSource,
    pair: &TradingPair,
    depth: Option<DepthTarget>,
    cached_book: Option<&OrderBook>,
) -> Result<Price> {
    let target = match depth.filter(|d| d.amount().is_positive()) {
        Some(t) => t,
        None => return Ok(source.ticker_prices(pair)?.bid),
    };

    let fetched;
    let book = match cached_book {
        Some(book) => book,
        None => {
            fetched = source.orderbook(pair)?;
            &fetched
        }
    };

    let fee = source.market_fee(pair)?;
    let (sum_base, sum_quote) = sum_amounts(&target.scaled(Decimal::ONE + fee), &book.bids);

    if sum_quote.is_zero() {
        return Ok(Price::ZERO);
    }
    Ok(Price::new(sum_base / sum_quote))
}

/// Average price at which `depth` worth of QUOTE could be bought from
/// the asks (the best attainable "sell price" of the market).
///
/// Mirror image of [`market_buy_price`]; falls back to the ticker's
/// best ask with no depth.
pub fn market_sell_price(
    source: &dyn MarketPriceSource,
    pair: &TradingPair,
    depth: Option<DepthTarget>,
    cached_book: Option<&OrderBook>,
) -> Result<Price> {
    let target = match depth.filter(|d| d.amount().is_positive()) {
        Some(t) => t,
        None => return Ok(source.ticker_prices(pair)?.ask),
    };

    let fetched;
    let book = match cached_book {
        Some(book) => book,
        None => {
            fetched = source.orderbook(pair)?;
            &fetched
        }
    };

    let fee = source.market_fee(pair)?;
    let (sum_base, sum_quote) = sum_amounts(&target.scaled(Decimal::ONE + fee), &book.asks);

    if sum_quote.is_zero() {
        return Ok(Price::ZERO);
    }
    Ok(Price::new(sum_base / sum_quote))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockMarketPriceSource;
    use flexmm_core::Ticker;
    use rust_decimal_macros::dec;

    fn level(price: Decimal, quantity: Decimal) -> OrderBookLevel {
        OrderBookLevel::new(Price::new(price), Size::new(quantity))
    }

    fn pair() -> TradingPair {
        "LTC/BTS".parse().unwrap()
    }

    fn fee_free_source(book: OrderBook) -> MockMarketPriceSource {
        let mut source = MockMarketPriceSource::new();
        source.expect_market_fee().returning(|_| Ok(dec!(0)));
        source.expect_orderbook().returning(move |_| Ok(book.clone()));
        source
    }

    #[test]
    fn test_full_level_consumption() {
        // Two bid levels: 10 quote @ 2, 10 quote @ 1.
        let book = OrderBook::new(vec![level(dec!(2), dec!(10)), level(dec!(1), dec!(10))], vec![]);
        let source = fee_free_source(book);

        // Quote target of 20 consumes both levels fully:
        // base = 20 + 10 = 30, quote = 20 -> price 1.5
        let price = market_buy_price(
            &source,
            &pair(),
            Some(DepthTarget::Quote(Size::new(dec!(20)))),
            None,
        )
        .unwrap();
        assert_eq!(price.inner(), dec!(1.5));
    }

    #[test]
    fn test_fractional_level_consumption() {
        let book = OrderBook::new(vec![level(dec!(2), dec!(10)), level(dec!(1), dec!(10))], vec![]);
        let source = fee_free_source(book);

        // Quote target of 15: full first level (10), half of second (5).
        // base = 20 + 5 = 25, quote = 15 -> price 25/15
        let price = market_buy_price(
            &source,
            &pair(),
            Some(DepthTarget::Quote(Size::new(dec!(15)))),
            None,
        )
        .unwrap();
        assert_eq!(price.inner(), dec!(25) / dec!(15));
    }

    #[test]
    fn test_base_target_walk() {
        let book = OrderBook::new(vec![level(dec!(2), dec!(10)), level(dec!(1), dec!(10))], vec![]);
        let source = fee_free_source(book);

        // Base target of 25: first level gives base 20, then 5 base from
        // the 1.0 level (5 quote). base = 25, quote = 15.
        let price = market_buy_price(
            &source,
            &pair(),
            Some(DepthTarget::Base(Size::new(dec!(25)))),
            None,
        )
        .unwrap();
        assert_eq!(price.inner(), dec!(25) / dec!(15));
    }

    #[test]
    fn test_fee_inflates_target() {
        let book = OrderBook::new(vec![level(dec!(2), dec!(10)), level(dec!(1), dec!(10))], vec![]);
        let mut source = MockMarketPriceSource::new();
        source.expect_market_fee().returning(|_| Ok(dec!(0.5)));
        source.expect_orderbook().returning(move |_| Ok(book.clone()));

        // Quote target 10 inflated by 50% -> effective 15.
        let price = market_buy_price(
            &source,
            &pair(),
            Some(DepthTarget::Quote(Size::new(dec!(10)))),
            None,
        )
        .unwrap();
        assert_eq!(price.inner(), dec!(25) / dec!(15));
    }

    #[test]
    fn test_empty_book_yields_zero() {
        let source = fee_free_source(OrderBook::default());
        let price = market_buy_price(
            &source,
            &pair(),
            Some(DepthTarget::Quote(Size::new(dec!(5)))),
            None,
        )
        .unwrap();
        assert!(price.is_zero());
    }

    #[test]
    fn test_zero_depth_uses_ticker() {
        let mut source = MockMarketPriceSource::new();
        source
            .expect_ticker_prices()
            .returning(|_| Ok(Ticker::new(Price::new(dec!(99)), Price::new(dec!(101)))));

        let bid =
            market_buy_price(&source, &pair(), Some(DepthTarget::Quote(Size::ZERO)), None).unwrap();
        let ask = market_sell_price(&source, &pair(), None, None).unwrap();
        assert_eq!(bid.inner(), dec!(99));
        assert_eq!(ask.inner(), dec!(101));
    }

    #[test]
    fn test_idempotent_over_cached_book() {
        let book = OrderBook::new(
            vec![level(dec!(2), dec!(10)), level(dec!(1), dec!(10))],
            vec![level(dec!(3), dec!(10))],
        );
        let mut source = MockMarketPriceSource::new();
        source.expect_market_fee().returning(|_| Ok(dec!(0.001)));

        let depth = Some(DepthTarget::Quote(Size::new(dec!(12))));
        let first = market_buy_price(&source, &pair(), depth, Some(&book)).unwrap();
        let second = market_buy_price(&source, &pair(), depth, Some(&book)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_sell_price_walks_asks() {
        let book = OrderBook::new(vec![], vec![level(dec!(1), dec!(10)), level(dec!(2), dec!(10))]);
        let source = fee_free_source(book);

        // Quote target 20: base = 10 + 20 = 30, quote = 20 -> 1.5
        let price = market_sell_price(
            &source,
            &pair(),
            Some(DepthTarget::Quote(Size::new(dec!(20)))),
            None,
        )
        .unwrap();
        assert_eq!(price.inner(), dec!(1.5));
    }
}
