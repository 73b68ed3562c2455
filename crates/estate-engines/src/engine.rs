//! The sub-engine contract.
//!
//! A sub-engine owns one slice of simulated behavior. The orchestrator
//! calls [`SubEngine::initialize`] once, [`SubEngine::update`] every tick
//! in registration order, and [`SubEngine::cleanup`] on shutdown.
//!
//! Engines learn about events from other engines through an [`Inbox`]:
//! a bus subscription forwards matching events into an unbounded channel,
//! and the engine drains the channel at the start of its next `update`.

use std::ops::Range;

use chrono::{DateTime, Utc};
use estate_events::{EventBus, HandlerError, HandlerId, TopicPattern};
use estate_types::{GameEvent, GameState};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::error::EngineError;
use crate::rng::SimRng;

/// How much simulated time a tick covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickDelta {
    /// Tick number after advancing.
    pub tick: u64,
    /// Simulated hours covered by this tick.
    pub elapsed_hours: u64,
    /// `elapsed_hours / 24`.
    pub elapsed_days: f64,
    /// Day counter before the tick.
    pub previous_day: u64,
    /// Day counter after the tick.
    pub day: u64,
    /// Simulated instant after the tick.
    pub now: DateTime<Utc>,
}

impl TickDelta {
    /// Whether at least one day boundary was crossed.
    pub const fn day_changed(&self) -> bool {
        self.day > self.previous_day
    }

    /// The days that began during this tick (empty if none).
    pub const fn new_days(&self) -> Range<u64> {
        if self.day > self.previous_day {
            self.previous_day.saturating_add(1)..self.day.saturating_add(1)
        } else {
            self.day..self.day
        }
    }
}

/// Everything an engine may touch during one update.
pub struct TickContext<'a> {
    /// The authoritative game state.
    pub state: &'a mut GameState,
    /// The event bus.
    pub bus: &'a mut EventBus,
    /// Random source for this tick.
    pub rng: &'a mut dyn SimRng,
    /// Time covered by this tick.
    pub delta: TickDelta,
}

impl core::fmt::Debug for TickContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TickContext")
            .field("delta", &self.delta)
            .finish_non_exhaustive()
    }
}

/// Lifecycle implemented by every simulation engine.
pub trait SubEngine: Send {
    /// Stable engine name used in logs and tick summaries.
    fn name(&self) -> &'static str;

    /// Subscribe to the topics the engine reacts to.
    fn initialize(&mut self, state: &GameState, bus: &mut EventBus) -> Result<(), EngineError>;

    /// Advance the engine's slice of the simulation by one tick.
    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EngineError>;

    /// Unsubscribe from the bus.
    fn cleanup(&mut self, bus: &mut EventBus);
}

/// Channel-backed mailbox fed by bus subscriptions.
#[derive(Debug)]
pub struct Inbox<T> {
    sender: UnboundedSender<T>,
    receiver: UnboundedReceiver<T>,
    subscriptions: Vec<HandlerId>,
}

impl<T: Send + 'static> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Inbox<T> {
    /// Create an empty inbox with no subscriptions.
    pub fn new() -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            sender,
            receiver,
            subscriptions: Vec::new(),
        }
    }

    /// Forward every event matching `pattern` for which `select` returns a
    /// message into this inbox.
    pub fn subscribe<F>(&mut self, bus: &mut EventBus, pattern: impl Into<TopicPattern>, select: F)
    where
        F: Fn(&GameEvent) -> Option<T> + Send + 'static,
    {
        let sender = self.sender.clone();
        let id = bus.on(pattern, move |event: &GameEvent| {
            if let Some(message) = select(event) {
                if sender.send(message).is_err() {
                    return Err(HandlerError::InboxClosed);
                }
            }
            Ok(())
        });
        self.subscriptions.push(id);
    }

    /// Take every queued message, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Whether the inbox has any subscriptions.
    pub fn is_subscribed(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Remove every subscription from `bus`.
    pub fn unsubscribe_all(&mut self, bus: &mut EventBus) {
        let count = self.subscriptions.len();
        for id in self.subscriptions.drain(..) {
            bus.off(id);
        }
        debug!(count, "inbox unsubscribed");
    }
}

#[cfg(test)]
mod tests {
    use estate_types::events::DayPassedDetails;

    use super::*;

    #[test]
    fn new_days_covers_crossed_boundaries() {
        let delta = TickDelta {
            tick: 1,
            elapsed_hours: 72,
            elapsed_days: 3.0,
            previous_day: 4,
            day: 7,
            now: DateTime::<Utc>::default(),
        };
        assert!(delta.day_changed());
        assert_eq!(delta.new_days().collect::<Vec<_>>(), vec![5, 6, 7]);

        let same = TickDelta {
            previous_day: 7,
            ..delta
        };
        assert!(!same.day_changed());
        assert_eq!(same.new_days().count(), 0);
    }

    #[test]
    fn inbox_receives_selected_events() {
        let mut bus = EventBus::new();
        let mut inbox: Inbox<u64> = Inbox::new();
        inbox.subscribe(&mut bus, "game:day_passed", |event| match event {
            GameEvent::DayPassed(details) => Some(details.day),
            _ => None,
        });
        assert!(inbox.is_subscribed());

        bus.emit(GameEvent::DayPassed(DayPassedDetails { day: 1 }));
        bus.emit(GameEvent::DayPassed(DayPassedDetails { day: 2 }));
        assert_eq!(inbox.drain(), vec![1, 2]);
        assert!(inbox.drain().is_empty());

        inbox.unsubscribe_all(&mut bus);
        assert_eq!(bus.listener_count("game:day_passed"), 0);
    }
}
