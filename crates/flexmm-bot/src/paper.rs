//! In-memory paper venue.
//!
//! Simulates one market with a random-walk mid price, a fixed relative
//! spread, and an order book that fills resting orders when the walk
//! crosses them. Used for dry runs; the price source and account
//! handles share the same venue state so a worker sees a consistent
//! world.

use std::collections::HashMap;
use std::sync::Arc;

use flexmm_core::{
    Order, OrderBook, OrderBookLevel, OrderId, OrderSide, Price, Size, Symbol, Ticker, Trade,
    TradingPair,
};
use flexmm_ladder::{AccountClient, AccountError};
use flexmm_pricing::{MarketPriceSource, SourceError};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

/// Book levels synthesized on each side of the spread.
const BOOK_LEVELS: u32 = 5;

struct VenueInner {
    pair: TradingPair,
    mid: Decimal,
    half_spread: Decimal,
    fee: Decimal,
    orders: HashMap<OrderId, Order>,
    balances: HashMap<Symbol, Decimal>,
    last_trade: Option<Trade>,
    next_id: u64,
    rng: StdRng,
}

impl VenueInner {
    fn bid(&self) -> Decimal {
        self.mid * (Decimal::ONE - self.half_spread)
    }

    fn ask(&self) -> Decimal {
        self.mid * (Decimal::ONE + self.half_spread)
    }

    fn crossed(&self, order: &Order) -> bool {
        match order.side {
            OrderSide::Buy => self.ask() <= order.price.inner(),
            OrderSide::Sell => self.bid() >= order.price.inner(),
        }
    }

    /// Settle one order at its limit price and record the trade.
    fn fill(&mut self, order: &Order) {
        let quote = order.quote_amount.inner();
        let base = quote * order.price.inner();
        let (base_delta, quote_delta) = match order.side {
            OrderSide::Buy => (-base, quote),
            OrderSide::Sell => (base, -quote),
        };
        let base_symbol = self.pair.base().clone();
        let quote_symbol = self.pair.quote().clone();
        *self.balances.entry(base_symbol).or_default() += base_delta;
        *self.balances.entry(quote_symbol).or_default() += quote_delta;
        self.last_trade = Some(Trade {
            price: order.price,
            base: Size::new(base),
            quote: Size::new(quote),
        });
        debug!(market = %self.pair, side = %order.side, price = %order.price, "paper fill");
    }
}

/// A simulated market plus the account trading on it.
#[derive(Clone)]
pub struct PaperVenue {
    inner: Arc<Mutex<VenueInner>>,
}

impl PaperVenue {
    pub fn new(
        pair: TradingPair,
        mid: Decimal,
        half_spread: Decimal,
        fee: Decimal,
        base_funds: Decimal,
        quote_funds: Decimal,
        seed: u64,
    ) -> Self {
        let mut balances = HashMap::new();
        balances.insert(pair.base().clone(), base_funds);
        balances.insert(pair.quote().clone(), quote_funds);
        Self {
            inner: Arc::new(Mutex::new(VenueInner {
                pair,
                mid,
                half_spread,
                fee,
                orders: HashMap::new(),
                balances,
                last_trade: None,
                next_id: 0,
                rng: StdRng::seed_from_u64(seed),
            })),
        }
    }

    /// Advance the random walk one step (at most +/- 1%) and fill any
    /// resting orders the new price crossed. Returns true when a fill
    /// happened.
    pub fn step(&self) -> bool {
        let mut inner = self.inner.lock();
        let change = inner.rng.gen_range(-0.01..0.01_f64);
        let factor = Decimal::ONE + Decimal::from_f64(change).unwrap_or_default();
        inner.mid = (inner.mid * factor).max(Decimal::new(1, 4));

        let crossed: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| inner.crossed(o))
            .cloned()
            .collect();
        for order in &crossed {
            inner.orders.remove(&order.id);
            inner.fill(order);
        }
        !crossed.is_empty()
    }

    pub fn source(&self) -> PaperSource {
        PaperSource {
            inner: self.inner.clone(),
        }
    }

    pub fn account(&self) -> PaperAccount {
        PaperAccount {
            inner: self.inner.clone(),
        }
    }

    #[cfg(test)]
    fn set_mid(&self, mid: Decimal) {
        self.inner.lock().mid = mid;
    }
}

/// Read-only market data handle.
#[derive(Clone)]
pub struct PaperSource {
    inner: Arc<Mutex<VenueInner>>,
}

impl MarketPriceSource for PaperSource {
    fn ticker_prices(&self, _pair: &TradingPair) -> Result<Ticker, SourceError> {
        let inner = self.inner.lock();
        Ok(Ticker::new(Price::new(inner.bid()), Price::new(inner.ask())))
    }

    fn orderbook(&self, _pair: &TradingPair) -> Result<OrderBook, SourceError> {
        let inner = self.inner.lock();
        let level_quote = Size::new(Decimal::new(100, 0));
        let step = inner.half_spread.max(Decimal::new(1, 3));
        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for i in 0..BOOK_LEVELS {
            let away = step * Decimal::from(i);
            bids.push(OrderBookLevel::new(
                Price::new(inner.bid() * (Decimal::ONE - away)),
                level_quote,
            ));
            asks.push(OrderBookLevel::new(
                Price::new(inner.ask() * (Decimal::ONE + away)),
                level_quote,
            ));
        }
        Ok(OrderBook::new(bids, asks))
    }

    fn market_fee(&self, _pair: &TradingPair) -> Result<Decimal, SourceError> {
        Ok(self.inner.lock().fee)
    }
}

/// Account handle over the shared venue state.
#[derive(Clone)]
pub struct PaperAccount {
    inner: Arc<Mutex<VenueInner>>,
}

impl PaperAccount {
    fn place(
        &mut self,
        side: OrderSide,
        quote_amount: Size,
        price: Price,
    ) -> Result<Option<Order>, AccountError> {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let order = Order {
            id: OrderId::new(format!("paper-{}", inner.next_id)),
            side,
            price,
            quote_amount,
            remaining_quote: quote_amount,
        };
        if inner.crossed(&order) {
            // Marketable on arrival: settle it without resting.
            inner.fill(&order);
            return Ok(None);
        }
        inner.orders.insert(order.id.clone(), order.clone());
        Ok(Some(order))
    }
}

impl AccountClient for PaperAccount {
    fn own_orders(&self) -> Result<HashMap<OrderId, Order>, AccountError> {
        Ok(self.inner.lock().orders.clone())
    }

    fn order(&self, id: &OrderId) -> Result<Option<Order>, AccountError> {
        Ok(self.inner.lock().orders.get(id).cloned())
    }

    fn cancel_all_orders(&mut self) -> Result<(), AccountError> {
        self.inner.lock().orders.clear();
        Ok(())
    }

    fn place_buy_order(
        &mut self,
        quote_amount: Size,
        price: Price,
    ) -> Result<Option<Order>, AccountError> {
        self.place(OrderSide::Buy, quote_amount, price)
    }

    fn place_sell_order(
        &mut self,
        quote_amount: Size,
        price: Price,
    ) -> Result<Option<Order>, AccountError> {
        self.place(OrderSide::Sell, quote_amount, price)
    }

    fn balance(&self, asset: &Symbol) -> Result<Size, AccountError> {
        let balance = self
            .inner
            .lock()
            .balances
            .get(asset)
            .copied()
            .unwrap_or_default()
            .max(Decimal::ZERO);
        Ok(Size::new(balance))
    }

    fn last_own_trade(&self) -> Result<Option<Trade>, AccountError> {
        Ok(self.inner.lock().last_trade.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn venue() -> PaperVenue {
        PaperVenue::new(
            "LTC/BTS".parse().unwrap(),
            dec!(1),
            dec!(0.001),
            dec!(0.001),
            dec!(1000),
            dec!(1000),
            7,
        )
    }

    #[test]
    fn test_ticker_straddles_mid() {
        let venue = venue();
        let ticker = venue.source().ticker_prices(&"LTC/BTS".parse().unwrap()).unwrap();
        assert!(ticker.bid.inner() < dec!(1));
        assert!(ticker.ask.inner() > dec!(1));
    }

    #[test]
    fn test_resting_order_fills_when_crossed() {
        let venue = venue();
        let mut account = venue.account();
        let placed = account
            .place_buy_order(Size::new(dec!(10)), Price::new(dec!(0.95)))
            .unwrap()
            .unwrap();
        assert_eq!(account.own_orders().unwrap().len(), 1);

        venue.set_mid(dec!(0.9));
        assert!(venue.step() || account.order(&placed.id).unwrap().is_none());
        assert!(account.own_orders().unwrap().is_empty());
        assert!(account.last_own_trade().unwrap().is_some());
    }

    #[test]
    fn test_marketable_order_settles_immediately() {
        let venue = venue();
        let mut account = venue.account();
        let placed = account
            .place_buy_order(Size::new(dec!(10)), Price::new(dec!(2)))
            .unwrap();
        assert!(placed.is_none());
        assert!(account.own_orders().unwrap().is_empty());

        // Paid roughly 10 quote at the limit price out of the base funds.
        let base = account.balance(&Symbol::new("BTS").unwrap()).unwrap();
        assert!(base.inner() < dec!(1000));
        let quote = account.balance(&Symbol::new("LTC").unwrap()).unwrap();
        assert_eq!(quote.inner(), dec!(1010));
    }

    #[test]
    fn test_walk_stays_within_one_percent() {
        let venue = venue();
        for _ in 0..100 {
            let before = venue.source().ticker_prices(&"LTC/BTS".parse().unwrap()).unwrap();
            venue.step();
            let after = venue.source().ticker_prices(&"LTC/BTS".parse().unwrap()).unwrap();
            let shift = (after.bid.inner() - before.bid.inner()).abs() / before.bid.inner();
            assert!(shift < dec!(0.011));
        }
    }
}
