//! Main application orchestration.
//!
//! Builds one worker per configured market, wires each to the paper
//! venue, and drives the whole set from a single timer loop. Venue
//! fills are relayed as market-update events so touched ladders are
//! examined without waiting for the next tick window.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use flexmm_core::TradingPair;
use flexmm_ladder::{Dispatcher, EventKind, MaintenanceController, Worker};
use flexmm_pricing::PriceDiscoveryEngine;
use flexmm_state::JsonFileStore;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::paper::{PaperAccount, PaperVenue};

/// Paper venue parameters; every simulated market starts identical.
const PAPER_MID: Decimal = Decimal::ONE;
const PAPER_HALF_SPREAD: Decimal = Decimal::from_parts(2, 0, 0, false, 3);
const PAPER_FEE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);
const PAPER_FUNDS: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Main application.
pub struct Application {
    config: AppConfig,
    dispatcher: Dispatcher<Worker<PaperAccount, JsonFileStore>>,
    venues: Vec<PaperVenue>,
}

impl Application {
    /// Build every configured worker. Fails fast on any malformed
    /// worker config rather than trading with the rest.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let mut dispatcher = Dispatcher::new();
        let mut venues = Vec::new();

        for (index, (name, worker_config)) in config.workers.iter().enumerate() {
            let pair: TradingPair = worker_config.market.parse()?;
            let strategy = worker_config.strategy.build()?;

            if strategy.external_feed {
                warn!(
                    worker = %name,
                    source = %strategy.external_price_source,
                    "external price feeds are not available on the paper venue"
                );
            }

            let venue = PaperVenue::new(
                pair.clone(),
                PAPER_MID,
                PAPER_HALF_SPREAD,
                PAPER_FEE,
                PAPER_FUNDS,
                PAPER_FUNDS,
                index as u64,
            );
            let engine = PriceDiscoveryEngine::new(
                pair,
                Box::new(venue.source()),
                strategy.intermediate_asset.clone(),
            )
            .with_depth(strategy.center_price_depth)
            .with_last_trade(strategy.center_price_from_last_trade);

            let store = JsonFileStore::new(Path::new(&config.data_dir), name);
            let controller = MaintenanceController::new(strategy, engine, venue.account(), store)?;
            info!(worker = %name, market = %controller.pair(), "worker configured");

            dispatcher.add_handler(
                Worker::new(name.clone(), controller),
                &[EventKind::Tick, EventKind::MarketUpdate],
            );
            venues.push(venue);
        }

        Ok(Self {
            config,
            dispatcher,
            venues,
        })
    }

    pub fn workers(&self) -> &[Worker<PaperAccount, JsonFileStore>] {
        self.dispatcher.handlers()
    }

    /// One timer iteration: advance the simulated markets, then fan
    /// the events out to the workers.
    pub fn tick_once(&mut self) {
        let mut filled = false;
        for venue in &self.venues {
            filled |= venue.step();
        }
        let now = Utc::now();
        self.dispatcher.dispatch(EventKind::Tick, now);
        if filled {
            self.dispatcher.dispatch(EventKind::MarketUpdate, now);
        }
    }

    /// Run the timer loop until Ctrl-C.
    pub async fn run(mut self) -> AppResult<()> {
        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));
        info!(
            workers = self.dispatcher.handlers().len(),
            tick_interval_ms = self.config.tick_interval_ms,
            "starting event loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick_once();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        Ok(())
    }
}
