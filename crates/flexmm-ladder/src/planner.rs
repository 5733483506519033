//! Ladder planning: center price + configuration -> concrete orders.

use flexmm_core::{OrderSide, Price, Size};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::LadderConfig;

/// Free balances of the market's two assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balances {
    pub base: Size,
    pub quote: Size,
}

/// One order the planner wants on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderIntent {
    pub side: OrderSide,
    pub price: Price,
    /// QUOTE amount for both sides.
    pub quote_amount: Size,
}

/// Planned ladder, in placement order: buys far-from-center first,
/// then sells nearest-to-center first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadderPlan {
    pub intents: Vec<OrderIntent>,
}

impl LadderPlan {
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    pub fn buys(&self) -> impl Iterator<Item = &OrderIntent> {
        self.intents.iter().filter(|i| i.side == OrderSide::Buy)
    }

    pub fn sells(&self) -> impl Iterator<Item = &OrderIntent> {
        self.intents.iter().filter(|i| i.side == OrderSide::Sell)
    }
}

/// Relative share of BASE and QUOTE holdings at the given price:
/// `base_ratio = base / (base + quote * price)`, `quote_ratio = 1 - base_ratio`.
pub fn calc_ratios(balances: &Balances, price: Price) -> (Decimal, Decimal) {
    let quote_value_in_base = balances.quote.notional(price);
    let sum_value = balances.base.inner() + quote_value_in_base;
    if sum_value.is_zero() {
        // No holdings at all; ratios are undefined, report all-quote so
        // the empty buy side is suppressed rather than divided by zero.
        return (Decimal::ZERO, Decimal::ONE);
    }
    let base_ratio = balances.base.inner() / sum_value;
    (base_ratio, Decimal::ONE - base_ratio)
}

/// Compute the target ladder for the given center price and balances.
///
/// Buy prices start at `center / (1 + buy_distance)` and step away
/// geometrically; sells mirror upward. The buy sequence is reversed so
/// the farthest, least price-sensitive orders are placed first and the
/// closest order lands last. Allocation percentages pair with prices by
/// index after that arrangement. A side whose balance ratio is under
/// its stop ratio is suppressed entirely; a zero-sized order stops its
/// side early.
pub fn plan(center: Price, config: &LadderConfig, balances: &Balances) -> LadderPlan {
    let mut buy_price = center / (Decimal::ONE + config.buy_distance);
    let mut sell_price = center * (Decimal::ONE + config.sell_distance);

    let mut buy_prices = vec![buy_price];
    for _ in 1..config.buy_percentages.len() {
        buy_price = buy_price / (Decimal::ONE + config.buy_increment_step);
        buy_prices.push(buy_price);
    }

    let mut sell_prices = vec![sell_price];
    for _ in 1..config.sell_percentages.len() {
        sell_price = sell_price * (Decimal::ONE + config.sell_increment_step);
        sell_prices.push(sell_price);
    }

    debug!(?buy_prices, ?sell_prices, "ladder prices");

    // Stop-ratio guard runs against the pre-reset balances and center
    // price so a ladder that itself shifts the ratio cannot oscillate.
    let (base_ratio, quote_ratio) = calc_ratios(balances, center);
    if base_ratio < config.buy_stop_ratio {
        info!(%base_ratio, stop = %config.buy_stop_ratio, "buy ratio limit reached, not placing buy orders");
        buy_prices.clear();
    }
    if quote_ratio < config.sell_stop_ratio {
        info!(%quote_ratio, stop = %config.sell_stop_ratio, "sell ratio limit reached, not placing sell orders");
        sell_prices.clear();
    }

    let mut intents = Vec::with_capacity(buy_prices.len() + sell_prices.len());

    // Far end towards center for buys.
    buy_prices.reverse();
    for (price, percentage) in buy_prices.into_iter().zip(&config.buy_percentages) {
        let base_amount = balances.base.inner() * percentage;
        let quote_amount = base_amount / price.inner();
        if quote_amount.is_zero() {
            break;
        }
        intents.push(OrderIntent {
            side: OrderSide::Buy,
            price,
            quote_amount: Size::new(quote_amount),
        });
    }

    for (price, percentage) in sell_prices.into_iter().zip(&config.sell_percentages) {
        let quote_amount = balances.quote.inner() * percentage;
        if quote_amount.is_zero() {
            break;
        }
        intents.push(OrderIntent {
            side: OrderSide::Sell,
            price,
            quote_amount: Size::new(quote_amount),
        });
    }

    LadderPlan { intents }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LadderSettings;
    use rust_decimal_macros::dec;

    fn config() -> LadderConfig {
        LadderSettings {
            buy_distance: dec!(4),
            sell_distance: dec!(4),
            buy_orders: "30-20-10".to_string(),
            sell_orders: "10-20-30".to_string(),
            buy_increment_step: dec!(2),
            sell_increment_step: dec!(2),
            buy_stop_ratio: dec!(10),
            sell_stop_ratio: dec!(10),
            ..Default::default()
        }
        .build()
        .unwrap()
    }

    fn balances() -> Balances {
        Balances {
            base: Size::new(dec!(100)),
            quote: Size::new(dec!(100)),
        }
    }

    #[test]
    fn test_ratios_sum_to_one() {
        let (base_ratio, quote_ratio) = calc_ratios(&balances(), Price::new(dec!(3)));
        assert_eq!(base_ratio + quote_ratio, dec!(1));
    }

    #[test]
    fn test_ratios_with_no_holdings() {
        let empty = Balances {
            base: Size::ZERO,
            quote: Size::ZERO,
        };
        let (base_ratio, quote_ratio) = calc_ratios(&empty, Price::new(dec!(3)));
        assert_eq!(base_ratio + quote_ratio, dec!(1));
    }

    #[test]
    fn test_buy_prices_strictly_decreasing_away_from_center() {
        let plan = plan(Price::new(dec!(1)), &config(), &balances());
        // Placement order is far-first, so walking buys in placement
        // order gives strictly increasing prices towards center.
        let buys: Vec<_> = plan.buys().map(|i| i.price).collect();
        assert_eq!(buys.len(), 3);
        assert!(buys.windows(2).all(|w| w[0] < w[1]));
        // All below center by at least the distance.
        assert!(buys.iter().all(|p| p.inner() < dec!(1) / dec!(1.04) * dec!(1.0000001)));
    }

    #[test]
    fn test_sell_prices_strictly_increasing_away_from_center() {
        let plan = plan(Price::new(dec!(1)), &config(), &balances());
        let sells: Vec<_> = plan.sells().map(|i| i.price).collect();
        assert_eq!(sells.len(), 3);
        assert!(sells.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sells[0].inner(), dec!(1.04));
    }

    #[test]
    fn test_anchor_prices() {
        let plan = plan(Price::new(dec!(1)), &config(), &balances());
        let closest_buy = plan.buys().last().unwrap();
        assert_eq!(closest_buy.price.inner(), dec!(1) / dec!(1.04));
        let closest_sell = plan.sells().next().unwrap();
        assert_eq!(closest_sell.price.inner(), dec!(1.04));
    }

    #[test]
    fn test_far_buy_gets_first_percentage() {
        // Percentages pair with prices after the far-first reversal,
        // so the 30% allocation sits on the farthest buy.
        let plan = plan(Price::new(dec!(1)), &config(), &balances());
        let far_buy = plan.buys().next().unwrap();
        let base_amount = far_buy.quote_amount.notional(far_buy.price);
        assert!((base_amount - dec!(30)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sell_amounts_follow_percentages() {
        let plan = plan(Price::new(dec!(1)), &config(), &balances());
        let amounts: Vec<_> = plan.sells().map(|i| i.quote_amount.inner()).collect();
        assert_eq!(amounts, vec![dec!(10), dec!(20), dec!(30)]);
    }

    #[test]
    fn test_buy_stop_ratio_one_suppresses_buys() {
        let mut config = config();
        config.buy_stop_ratio = dec!(1);
        let plan = plan(Price::new(dec!(1)), &config, &balances());
        assert_eq!(plan.buys().count(), 0);
        assert_eq!(plan.sells().count(), 3);
    }

    #[test]
    fn test_sell_stop_ratio_one_suppresses_sells() {
        let mut config = config();
        config.sell_stop_ratio = dec!(1);
        let plan = plan(Price::new(dec!(1)), &config, &balances());
        assert_eq!(plan.sells().count(), 0);
        assert_eq!(plan.buys().count(), 3);
    }

    #[test]
    fn test_zero_balance_emits_no_orders() {
        let broke = Balances {
            base: Size::ZERO,
            quote: Size::new(dec!(100)),
        };
        let plan = plan(Price::new(dec!(1)), &config(), &broke);
        // Base ratio 0 suppresses buys via the stop guard; even with a
        // zero stop ratio the zero amounts would stop the side early.
        assert_eq!(plan.buys().count(), 0);
        assert_eq!(plan.sells().count(), 3);
    }
}
