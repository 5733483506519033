//! A named worker binding one maintenance controller to the event bus.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::account::AccountClient;
use crate::controller::MaintenanceController;
use crate::error::Result;
use crate::events::{EventHandler, EventKind};
use flexmm_state::StateStore;

/// Ticks arrive every few seconds; maintenance only needs a fraction
/// of that cadence. Market updates bypass the divider because they are
/// already edge-triggered.
const TICK_DIVIDER: u32 = 4;

/// Counts ticks and fires once every `divider` of them.
#[derive(Debug)]
struct TickGate {
    counter: u32,
    divider: u32,
}

impl TickGate {
    fn new(divider: u32) -> Self {
        Self {
            counter: 0,
            divider,
        }
    }

    fn admit(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.divider {
            self.counter = 0;
            return true;
        }
        false
    }
}

/// One configured market worker.
pub struct Worker<A: AccountClient, S: StateStore> {
    name: String,
    controller: MaintenanceController<A, S>,
    gate: TickGate,
}

impl<A: AccountClient, S: StateStore> Worker<A, S> {
    pub fn new(name: impl Into<String>, controller: MaintenanceController<A, S>) -> Self {
        Self {
            name: name.into(),
            controller,
            gate: TickGate::new(TICK_DIVIDER),
        }
    }

    pub fn controller(&self) -> &MaintenanceController<A, S> {
        &self.controller
    }
}

impl<A: AccountClient, S: StateStore> EventHandler for Worker<A, S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&mut self, kind: EventKind, now: DateTime<Utc>) -> Result<()> {
        match kind {
            EventKind::Tick => {
                if !self.gate.admit() {
                    return Ok(());
                }
                debug!(worker = %self.name, "tick maintenance");
                self.controller.maintain(now)
            }
            EventKind::MarketUpdate => {
                debug!(worker = %self.name, "market update maintenance");
                self.controller.maintain(now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_admits_every_nth_tick() {
        let mut gate = TickGate::new(4);
        let admitted: Vec<bool> = (0..8).map(|_| gate.admit()).collect();
        assert_eq!(
            admitted,
            vec![false, false, false, true, false, false, false, true]
        );
    }

    #[test]
    fn test_gate_with_divider_one_always_admits() {
        let mut gate = TickGate::new(1);
        assert!(gate.admit());
        assert!(gate.admit());
    }
}
