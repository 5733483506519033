//! Order-ladder planning and maintenance for the flexmm bot.
//!
//! Turns a center price into a symmetric ladder of buy/sell limit
//! orders and decides, on a throttled cadence, whether the resting
//! ladder must be left alone, bootstrapped, or fully reset.

pub mod account;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod planner;
pub mod worker;

pub use account::{AccountClient, AccountError};
pub use config::{parse_percentages, LadderConfig, LadderSettings};
pub use controller::{check_shift_too_big, MaintenanceController};
pub use error::{ConfigError, LadderError, Result};
pub use events::{Dispatcher, EventHandler, EventKind};
pub use planner::{plan, calc_ratios, Balances, LadderPlan, OrderIntent};
pub use worker::Worker;
