//! Ladder strategy configuration.
//!
//! `LadderSettings` is the raw worker-file surface (percent units, as a
//! human writes them); `LadderConfig` is the validated form the planner
//! and controller consume (fractions of 1). All validation happens at
//! construction; a bad config never reaches the trading loop.

use chrono::Duration;
use flexmm_core::{Size, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parse a dash-separated percentage list like `"30-20-10"` into
/// fractions `[0.30, 0.20, 0.10]`.
///
/// Rejected: non-numeric tokens, wrong delimiters (a `"10+5+1"` string
/// is a single bad token), non-positive entries, and lists summing to
/// more than 100%.
pub fn parse_percentages(raw: &str) -> Result<Vec<Decimal>, ConfigError> {
    let hundred = Decimal::ONE_HUNDRED;
    let mut fractions = Vec::new();

    for token in raw.split('-') {
        let value: Decimal = token
            .trim()
            .parse()
            .map_err(|_| ConfigError::percentages(raw, format!("bad entry {token:?}")))?;
        if value <= Decimal::ZERO {
            return Err(ConfigError::percentages(raw, "entries must be positive"));
        }
        fractions.push(value / hundred);
    }

    let sum: Decimal = fractions.iter().sum();
    if sum > Decimal::ONE {
        return Err(ConfigError::percentages(raw, "percentages exceed 100"));
    }

    Ok(fractions)
}

/// Raw worker configuration, percent units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LadderSettings {
    /// Buy anchor distance from center, percent.
    #[serde(default = "default_distance")]
    pub buy_distance: Decimal,
    /// Sell anchor distance from center, percent.
    #[serde(default = "default_distance")]
    pub sell_distance: Decimal,

    /// Dash-separated buy allocation percentages, far-side last.
    #[serde(default = "default_buy_orders")]
    pub buy_orders: String,
    /// Dash-separated sell allocation percentages.
    #[serde(default = "default_sell_orders")]
    pub sell_orders: String,

    /// Geometric spacing between successive buy orders, percent.
    #[serde(default = "default_increment_step")]
    pub buy_increment_step: Decimal,
    /// Geometric spacing between successive sell orders, percent.
    #[serde(default = "default_increment_step")]
    pub sell_increment_step: Decimal,

    /// Suppress the buy side when the BASE share of holdings falls
    /// below this, percent.
    #[serde(default = "default_stop_ratio")]
    pub buy_stop_ratio: Decimal,
    /// Suppress the sell side when the QUOTE share falls below this,
    /// percent.
    #[serde(default = "default_stop_ratio")]
    pub sell_stop_ratio: Decimal,

    /// Take the center price from an external feed.
    #[serde(default)]
    pub external_feed: bool,
    /// Named external price source.
    #[serde(default = "default_external_source")]
    pub external_price_source: String,

    /// QUOTE depth for the own-market center price; 0 = top of book.
    #[serde(default)]
    pub center_price_depth: Decimal,

    /// Take the center price from the own last trade once bootstrapped.
    #[serde(default)]
    pub center_price_from_last_trade: bool,

    /// Reset the ladder when a closest-to-center order was touched.
    #[serde(default = "default_true")]
    pub reset_on_partial_fill: bool,
    /// Filled fraction that counts as touched, percent.
    #[serde(default = "default_partial_fill_threshold")]
    pub partial_fill_threshold: Decimal,

    /// Reset the ladder when the center price moved too far.
    #[serde(default)]
    pub reset_on_price_change: bool,
    /// Relative center-price shift that triggers a reset, percent.
    #[serde(default = "default_price_change_threshold")]
    pub price_change_threshold: Decimal,

    /// Minimum seconds between maintenance passes.
    #[serde(default = "default_min_check_interval_secs")]
    pub min_check_interval_secs: u64,

    /// Intermediate asset for cross-market derivation.
    #[serde(default = "default_intermediate_asset")]
    pub intermediate_asset: String,
}

fn default_distance() -> Decimal {
    Decimal::from(3)
}

fn default_buy_orders() -> String {
    "6-4".to_string()
}

fn default_sell_orders() -> String {
    "4-6".to_string()
}

fn default_increment_step() -> Decimal {
    Decimal::TWO
}

fn default_stop_ratio() -> Decimal {
    Decimal::from(50)
}

fn default_external_source() -> String {
    "gecko".to_string()
}

fn default_partial_fill_threshold() -> Decimal {
    Decimal::from(90)
}

fn default_price_change_threshold() -> Decimal {
    Decimal::new(5, 1) // 0.5
}

fn default_min_check_interval_secs() -> u64 {
    5
}

fn default_intermediate_asset() -> String {
    "BTC".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            buy_distance: default_distance(),
            sell_distance: default_distance(),
            buy_orders: default_buy_orders(),
            sell_orders: default_sell_orders(),
            buy_increment_step: default_increment_step(),
            sell_increment_step: default_increment_step(),
            buy_stop_ratio: default_stop_ratio(),
            sell_stop_ratio: default_stop_ratio(),
            external_feed: false,
            external_price_source: default_external_source(),
            center_price_depth: Decimal::ZERO,
            center_price_from_last_trade: false,
            reset_on_partial_fill: true,
            partial_fill_threshold: default_partial_fill_threshold(),
            reset_on_price_change: false,
            price_change_threshold: default_price_change_threshold(),
            min_check_interval_secs: default_min_check_interval_secs(),
            intermediate_asset: default_intermediate_asset(),
        }
    }
}

impl LadderSettings {
    /// Validate and convert to the fractional form.
    pub fn build(&self) -> Result<LadderConfig, ConfigError> {
        let hundred = Decimal::ONE_HUNDRED;

        let buy_percentages = parse_percentages(&self.buy_orders)?;
        let sell_percentages = parse_percentages(&self.sell_orders)?;

        for (field, value) in [
            ("buy_distance", self.buy_distance),
            ("sell_distance", self.sell_distance),
            ("buy_increment_step", self.buy_increment_step),
            ("sell_increment_step", self.sell_increment_step),
        ] {
            if value < Decimal::ZERO {
                return Err(ConfigError::value(field, "must not be negative"));
            }
        }

        for (field, value) in [
            ("buy_stop_ratio", self.buy_stop_ratio),
            ("sell_stop_ratio", self.sell_stop_ratio),
            ("partial_fill_threshold", self.partial_fill_threshold),
        ] {
            if value < Decimal::ZERO || value > hundred {
                return Err(ConfigError::value(field, "must be between 0 and 100"));
            }
        }

        if self.price_change_threshold <= Decimal::ZERO {
            return Err(ConfigError::value(
                "price_change_threshold",
                "must be positive",
            ));
        }

        if self.center_price_depth < Decimal::ZERO {
            return Err(ConfigError::value(
                "center_price_depth",
                "must not be negative",
            ));
        }

        Ok(LadderConfig {
            buy_distance: self.buy_distance / hundred,
            sell_distance: self.sell_distance / hundred,
            buy_increment_step: self.buy_increment_step / hundred,
            sell_increment_step: self.sell_increment_step / hundred,
            buy_percentages,
            sell_percentages,
            buy_stop_ratio: self.buy_stop_ratio / hundred,
            sell_stop_ratio: self.sell_stop_ratio / hundred,
            external_feed: self.external_feed,
            external_price_source: self.external_price_source.clone(),
            center_price_depth: Size::new(self.center_price_depth),
            center_price_from_last_trade: self.center_price_from_last_trade,
            reset_on_partial_fill: self.reset_on_partial_fill,
            partial_fill_threshold: self.partial_fill_threshold / hundred,
            reset_on_price_change: self.reset_on_price_change,
            price_change_threshold: self.price_change_threshold / hundred,
            min_check_interval: Duration::seconds(self.min_check_interval_secs as i64),
            intermediate_asset: Symbol::new(&self.intermediate_asset)?,
        })
    }
}

/// Validated ladder configuration, all ratios as fractions of 1.
#[derive(Debug, Clone)]
pub struct LadderConfig {
    pub buy_distance: Decimal,
    pub sell_distance: Decimal,
    pub buy_increment_step: Decimal,
    pub sell_increment_step: Decimal,
    pub buy_percentages: Vec<Decimal>,
    pub sell_percentages: Vec<Decimal>,
    pub buy_stop_ratio: Decimal,
    pub sell_stop_ratio: Decimal,
    pub external_feed: bool,
    pub external_price_source: String,
    pub center_price_depth: Size,
    pub center_price_from_last_trade: bool,
    pub reset_on_partial_fill: bool,
    pub partial_fill_threshold: Decimal,
    pub reset_on_price_change: bool,
    pub price_change_threshold: Decimal,
    pub min_check_interval: Duration,
    pub intermediate_asset: Symbol,
}

impl LadderConfig {
    /// Number of orders a complete ladder holds.
    pub fn expected_order_count(&self) -> usize {
        self.buy_percentages.len() + self.sell_percentages.len()
    }
}
