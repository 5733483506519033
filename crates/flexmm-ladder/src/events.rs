//! Event routing between the host process and strategy workers.
//!
//! The host translates whatever it listens to (timers, venue
//! notifications) into [`EventKind`] values and pushes them through a
//! [`Dispatcher`]. Routing is an explicit table built at startup;
//! handlers run synchronously in registration order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::error;

use crate::error::Result;

/// Events a worker can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Periodic timer tick.
    Tick,
    /// Something changed on the worker's market.
    MarketUpdate,
}

/// A strategy worker's event entry point.
pub trait EventHandler {
    fn name(&self) -> &str;

    fn on_event(&mut self, kind: EventKind, now: DateTime<Utc>) -> Result<()>;
}

/// Static event-to-handler routing table.
///
/// One handler failing never stops delivery to the others; the error
/// is logged against the handler's name and dispatch continues.
pub struct Dispatcher<H: EventHandler> {
    handlers: Vec<H>,
    routes: HashMap<EventKind, Vec<usize>>,
}

impl<H: EventHandler> Dispatcher<H> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// Register a handler for the given events and return its slot.
    pub fn add_handler(&mut self, handler: H, events: &[EventKind]) -> usize {
        let slot = self.handlers.len();
        self.handlers.push(handler);
        for kind in events {
            self.routes.entry(*kind).or_default().push(slot);
        }
        slot
    }

    pub fn handlers(&self) -> &[H] {
        &self.handlers
    }

    /// Deliver one event to every handler routed to it.
    pub fn dispatch(&mut self, kind: EventKind, now: DateTime<Utc>) {
        let Some(slots) = self.routes.get(&kind) else {
            return;
        };
        for &slot in slots {
            let handler = &mut self.handlers[slot];
            if let Err(e) = handler.on_event(kind, now) {
                error!(worker = handler.name(), event = ?kind, error = %e, "event handler failed");
            }
        }
    }
}

impl<H: EventHandler> Default for Dispatcher<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountError;
    use crate::error::LadderError;

    struct Recorder {
        name: String,
        seen: Vec<EventKind>,
        fail: bool,
    }

    impl Recorder {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                seen: Vec::new(),
                fail: false,
            }
        }
    }

    impl EventHandler for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn on_event(&mut self, kind: EventKind, _now: DateTime<Utc>) -> Result<()> {
            self.seen.push(kind);
            if self.fail {
                return Err(LadderError::Account(AccountError::Venue("down".into())));
            }
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        "2020-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_routes_only_subscribed_events() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_handler(Recorder::new("ticks"), &[EventKind::Tick]);
        dispatcher.add_handler(
            Recorder::new("both"),
            &[EventKind::Tick, EventKind::MarketUpdate],
        );

        dispatcher.dispatch(EventKind::Tick, now());
        dispatcher.dispatch(EventKind::MarketUpdate, now());
        dispatcher.dispatch(EventKind::Tick, now());

        assert_eq!(dispatcher.handlers()[0].seen, vec![EventKind::Tick, EventKind::Tick]);
        assert_eq!(
            dispatcher.handlers()[1].seen,
            vec![EventKind::Tick, EventKind::MarketUpdate, EventKind::Tick]
        );
    }

    #[test]
    fn test_failing_handler_does_not_block_others() {
        let mut dispatcher = Dispatcher::new();
        let mut bad = Recorder::new("bad");
        bad.fail = true;
        dispatcher.add_handler(bad, &[EventKind::Tick]);
        dispatcher.add_handler(Recorder::new("good"), &[EventKind::Tick]);

        dispatcher.dispatch(EventKind::Tick, now());
        assert_eq!(dispatcher.handlers()[1].seen, vec![EventKind::Tick]);
    }
}
