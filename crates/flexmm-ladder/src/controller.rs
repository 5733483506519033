//! The maintenance state machine.
//!
//! Runs once per tick or market update, throttled by a minimum check
//! interval, and decides whether the resting ladder is left alone,
//! bootstrapped, or fully reset. A reset is cancel-then-replan treated
//! as one transaction: the center price is computed before anything is
//! cancelled, and a failed price computation degrades to an empty book
//! rather than stale mispriced orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use flexmm_core::{CenterPrice, Order, OrderId, OrderSide, Price, TradingPair};
use flexmm_pricing::{PriceDiscoveryEngine, PricingError};
use flexmm_state::{StateStore, StrategyState};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::account::AccountClient;
use crate::config::LadderConfig;
use crate::error::Result;
use crate::planner::{self, Balances};

/// True when the center price moved relative to its stored value by at
/// least `threshold`. The divisor is the new price, which makes the
/// check symmetric enough in both directions; a vanished new price
/// always counts as too big.
pub fn check_shift_too_big(old: Price, new: Price, threshold: Decimal) -> bool {
    match new.relative_shift_from(old) {
        Some(diff) => diff.abs() >= threshold,
        None => true,
    }
}

/// Closest-to-center open orders: the highest buy and the lowest sell.
/// Only these are refreshed by the partial-fill check; farther orders
/// cannot have filled without the closer ones filling first.
fn closest_orders(orders: &HashMap<OrderId, Order>) -> Vec<Order> {
    let mut closest = Vec::with_capacity(2);
    if let Some(buy) = orders
        .values()
        .filter(|o| o.side == OrderSide::Buy)
        .max_by(|a, b| a.price.cmp(&b.price))
    {
        closest.push(buy.clone());
    }
    if let Some(sell) = orders
        .values()
        .filter(|o| o.side == OrderSide::Sell)
        .min_by(|a, b| a.price.cmp(&b.price))
    {
        closest.push(sell.clone());
    }
    closest
}

/// Per-market maintenance controller.
///
/// Owns the persisted strategy state and the throttle; all mutation
/// happens inside a single synchronous maintenance pass.
pub struct MaintenanceController<A: AccountClient, S: StateStore> {
    pair: TradingPair,
    config: LadderConfig,
    engine: PriceDiscoveryEngine,
    account: A,
    store: S,
    state: StrategyState,
    last_check: DateTime<Utc>,
}

impl<A: AccountClient, S: StateStore> MaintenanceController<A, S> {
    /// Build a controller, loading any persisted state.
    pub fn new(
        config: LadderConfig,
        engine: PriceDiscoveryEngine,
        account: A,
        store: S,
    ) -> Result<Self> {
        let state = store.load()?.unwrap_or_default();
        let pair = engine.pair().clone();
        Ok(Self {
            pair,
            config,
            engine,
            account,
            store,
            state,
            // Far in the past so the first tick always runs.
            last_check: DateTime::<Utc>::MIN_UTC,
        })
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn account(&self) -> &A {
        &self.account
    }

    /// One maintenance pass.
    ///
    /// Checks run in a fixed order: ladder size, partial fills on the
    /// closest orders, center-price shift. The throttle only arms on a
    /// pass that took no action, so a reset is re-examined on the very
    /// next tick.
    pub fn maintain(&mut self, now: DateTime<Utc>) -> Result<()> {
        if now - self.last_check < self.config.min_check_interval {
            return Ok(());
        }

        let orders = self.account.own_orders()?;

        if orders.len() < self.config.expected_order_count() {
            debug!(
                market = %self.pair,
                open = orders.len(),
                expected = self.config.expected_order_count(),
                "ladder incomplete, bootstrapping"
            );
            self.place_orders()?;
            self.state.bootstrapped = true;
            self.store.save(&self.state)?;
            return Ok(());
        }

        if self.config.reset_on_partial_fill {
            for order in closest_orders(&orders) {
                let touched = match self.account.order(&order.id)? {
                    None => true,
                    Some(refreshed) => {
                        refreshed.filled_fraction() >= self.config.partial_fill_threshold
                    }
                };
                if touched {
                    info!(market = %self.pair, order = %order.id, "closest order touched, resetting ladder");
                    self.state.bootstrapped = true;
                    self.place_orders()?;
                    return Ok(());
                }
            }
        }

        if self.config.reset_on_price_change {
            if let Some(old) = self.state.center_price {
                let current = match self.compute_center() {
                    Ok(center) => center.price,
                    Err(e) => {
                        warn!(market = %self.pair, error = %e, "center price unavailable during shift check");
                        return self.halt_with_empty_book();
                    }
                };
                if check_shift_too_big(old, current, self.config.price_change_threshold) {
                    info!(market = %self.pair, %old, %current, "center price shifted, resetting ladder");
                    self.place_orders()?;
                    return Ok(());
                }
            }
        }

        self.last_check = now;
        Ok(())
    }

    /// Full reset: cancel the old ladder and place a new one.
    ///
    /// The center price is computed before cancelling so pulling our
    /// own orders cannot shift the price used for replacement. If no
    /// price is available the book is emptied and the pass ends; the
    /// next tick will try again.
    fn place_orders(&mut self) -> Result<()> {
        let center = match self.compute_center() {
            Ok(center) => center,
            Err(e) => {
                error!(market = %self.pair, error = %e, "failed to obtain center price");
                return self.halt_with_empty_book();
            }
        };

        self.account.cancel_all_orders()?;

        let balances = self.fetch_balances()?;
        let plan = planner::plan(center.price, &self.config, &balances);
        info!(market = %self.pair, %center, orders = plan.len(), "placing ladder");

        for intent in &plan.intents {
            let placed = match intent.side {
                OrderSide::Buy => self.account.place_buy_order(intent.quote_amount, intent.price)?,
                OrderSide::Sell => {
                    self.account.place_sell_order(intent.quote_amount, intent.price)?
                }
            };
            if placed.is_none() {
                // Matched immediately, no resting id. Keep planning the
                // remaining ladder entries.
                debug!(market = %self.pair, side = %intent.side, price = %intent.price, "order filled immediately");
            }
        }

        // Our own orders are now on the book; store the refreshed price
        // so the next shift check compares against what it will see.
        let stored_price = match self.compute_center() {
            Ok(center) => center.price,
            Err(e) => {
                warn!(market = %self.pair, error = %e, "could not refresh center price after placement");
                center.price
            }
        };
        self.state.center_price = Some(stored_price);
        self.store.save(&self.state)?;
        Ok(())
    }

    /// Cancel everything and record that no trusted price exists. The
    /// safe failure mode is an empty book, never stale orders believed
    /// fresh.
    fn halt_with_empty_book(&mut self) -> Result<()> {
        self.account.cancel_all_orders()?;
        self.state.center_price = None;
        self.store.save(&self.state)?;
        Ok(())
    }

    fn compute_center(&self) -> std::result::Result<CenterPrice, PricingError> {
        let last_trade = if self.config.center_price_from_last_trade && self.state.bootstrapped {
            match self.account.last_own_trade() {
                Ok(trade) => trade,
                Err(e) => {
                    warn!(market = %self.pair, error = %e, "failed to fetch last own trade");
                    None
                }
            }
        } else {
            None
        };
        self.engine
            .center_price(self.state.bootstrapped, last_trade.as_ref())
    }

    fn fetch_balances(&self) -> Result<Balances> {
        Ok(Balances {
            base: self.account.balance(self.pair.base())?,
            quote: self.account.balance(self.pair.quote())?,
        })
    }
}
