//! Synchronous publish/subscribe event bus.
//!
//! Handlers subscribe with a topic pattern and receive every matching
//! [`GameEvent`] in registration order. A handler that returns an error is
//! logged and skipped; its siblings still run. Handlers only ever see a
//! shared reference to the event, so they cannot emit back into the bus.
//! Follow-up events are produced by the orchestrator's reaction stage,
//! which drains the bus journal and wraps each dispatch in
//! [`EventBus::begin_reaction`] / [`EventBus::end_reaction`]. While a topic
//! is being reacted to, emitting that same topic is refused.

use estate_types::GameEvent;
use tracing::{trace, warn};

/// Wildcard matching every topic.
pub const WILDCARD: &str = "*";

/// Error returned by a failing handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    /// The handler forwards into a channel whose receiver was dropped.
    #[error("handler inbox closed")]
    InboxClosed,

    /// Any other handler failure.
    #[error("handler failed: {reason}")]
    Failed {
        /// Explanation of the failure.
        reason: String,
    },
}

/// Boxed event handler.
pub type Handler = Box<dyn FnMut(&GameEvent) -> Result<(), HandlerError> + Send>;

/// Opaque handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(u64);

/// Which topics a subscription matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicPattern {
    /// Exactly one topic (`tenant:rent_paid`).
    Exact(String),
    /// Every topic in a namespace (`tenant:*`).
    Namespace(String),
    /// Every topic (`*`).
    All,
}

impl TopicPattern {
    /// Parse a pattern string.
    pub fn parse(pattern: &str) -> Self {
        if pattern == WILDCARD {
            return Self::All;
        }
        match pattern.strip_suffix(":*") {
            Some(namespace) => Self::Namespace(namespace.to_owned()),
            None => Self::Exact(pattern.to_owned()),
        }
    }

    /// Whether `topic` matches this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(exact) => exact == topic,
            Self::Namespace(namespace) => topic
                .split_once(':')
                .is_some_and(|(ns, _)| ns == namespace),
        }
    }
}

impl From<&str> for TopicPattern {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

struct Subscription {
    id: HandlerId,
    pattern: TopicPattern,
    handler: Handler,
}

/// The event bus.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    journal: Vec<GameEvent>,
    reacting: Vec<&'static str>,
    emitted: u64,
    handler_failures: u64,
    refused: u64,
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("journal", &self.journal.len())
            .field("reacting", &self.reacting)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to every topic matching `pattern`.
    pub fn on<F>(&mut self, pattern: impl Into<TopicPattern>, handler: F) -> HandlerId
    where
        F: FnMut(&GameEvent) -> Result<(), HandlerError> + Send + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let pattern = pattern.into();
        trace!(handler = id.0, ?pattern, "handler subscribed");
        self.subscriptions.push(Subscription {
            id,
            pattern,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns whether it existed.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Publish an event to every matching handler, then journal it.
    ///
    /// Returns `false` without invoking any handler if the event's topic is
    /// currently being reacted to.
    pub fn emit(&mut self, event: GameEvent) -> bool {
        let topic = event.topic();
        if self.reacting.contains(&topic) {
            self.refused = self.refused.saturating_add(1);
            warn!(topic, "refusing to emit a topic while reacting to it");
            return false;
        }

        for subscription in self
            .subscriptions
            .iter_mut()
            .filter(|s| s.pattern.matches(topic))
        {
            if let Err(err) = (subscription.handler)(&event) {
                self.handler_failures = self.handler_failures.saturating_add(1);
                warn!(
                    topic,
                    handler = subscription.id.0,
                    error = %err,
                    "event handler failed"
                );
            }
        }

        self.emitted = self.emitted.saturating_add(1);
        trace!(topic, "event emitted");
        self.journal.push(event);
        true
    }

    /// Mark `topic` as being reacted to. Emits of it are refused until
    /// [`Self::end_reaction`].
    pub fn begin_reaction(&mut self, topic: &'static str) {
        self.reacting.push(topic);
    }

    /// Finish reacting to `topic`.
    pub fn end_reaction(&mut self, topic: &'static str) {
        if let Some(pos) = self.reacting.iter().rposition(|t| *t == topic) {
            self.reacting.remove(pos);
        }
    }

    /// Whether `topic` is currently being reacted to.
    pub fn is_reacting_to(&self, topic: &str) -> bool {
        self.reacting.contains(&topic)
    }

    /// Take every journaled event, oldest first.
    pub fn drain_journal(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Events journaled since the last drain.
    pub fn journal(&self) -> &[GameEvent] {
        &self.journal
    }

    /// Discard the journal.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    /// Total events emitted.
    pub const fn emitted_count(&self) -> u64 {
        self.emitted
    }

    /// Total handler failures.
    pub const fn handler_failures(&self) -> u64 {
        self.handler_failures
    }

    /// Total emits refused by the recursion guard.
    pub const fn refused_count(&self) -> u64 {
        self.refused
    }

    /// Number of subscriptions that would receive `topic`.
    pub fn listener_count(&self, topic: &str) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.pattern.matches(topic))
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use estate_types::events::{DayPassedDetails, LevelUpDetails};
    use estate_types::PlayerId;

    use super::*;

    fn day(day: u64) -> GameEvent {
        GameEvent::DayPassed(DayPassedDetails { day })
    }

    fn level_up() -> GameEvent {
        GameEvent::LevelUp(LevelUpDetails {
            player_id: PlayerId::new(),
            previous_level: 1,
            new_level: 2,
        })
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |label: &str| -> Handler {
                let log = Arc::clone(&log);
                let label = label.to_owned();
                Box::new(move |event: &GameEvent| {
                    log.lock().unwrap().push(format!("{label}:{}", event.topic()));
                    Ok(())
                })
            }
        };
        (log, make)
    }

    #[test]
    fn patterns_match_topics() {
        assert!(TopicPattern::parse("*").matches("tenant:rent_paid"));
        assert!(TopicPattern::parse("tenant:*").matches("tenant:rent_paid"));
        assert!(!TopicPattern::parse("tenant:*").matches("market:event_occurred"));
        assert!(TopicPattern::parse("game:day_passed").matches("game:day_passed"));
        assert!(!TopicPattern::parse("game:day_passed").matches("game:saved"));
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.on("game:day_passed", make("a"));
        bus.on("game:*", make("b"));
        bus.on("*", make("c"));
        bus.on("player:*", make("d"));

        assert!(bus.emit(day(1)));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:game:day_passed", "b:game:day_passed", "c:game:day_passed"]
        );
        assert_eq!(bus.emitted_count(), 1);
        assert_eq!(bus.listener_count("game:day_passed"), 3);
    }

    #[test]
    fn failing_handler_does_not_stop_siblings() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        bus.on("*", make("first"));
        bus.on("*", |_: &GameEvent| {
            Err(HandlerError::Failed {
                reason: String::from("boom"),
            })
        });
        bus.on("*", make("third"));

        assert!(bus.emit(day(1)));
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(bus.handler_failures(), 1);
        assert_eq!(bus.journal().len(), 1);
    }

    #[test]
    fn off_removes_handler() {
        let (log, make) = recorder();
        let mut bus = EventBus::new();
        let id = bus.on("*", make("a"));
        assert!(bus.off(id));
        assert!(!bus.off(id));
        bus.emit(day(1));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn recursion_guard_refuses_same_topic() {
        let mut bus = EventBus::new();
        bus.begin_reaction("game:day_passed");
        assert!(bus.is_reacting_to("game:day_passed"));
        assert!(!bus.emit(day(2)));
        assert!(bus.emit(level_up()));
        bus.end_reaction("game:day_passed");
        assert!(bus.emit(day(3)));
        assert_eq!(bus.refused_count(), 1);
        assert_eq!(bus.emitted_count(), 2);
    }

    #[test]
    fn drain_empties_journal() {
        let mut bus = EventBus::new();
        bus.emit(day(1));
        bus.emit(level_up());
        let drained = bus.drain_journal();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained.first().map(GameEvent::topic), Some("game:day_passed"));
        assert!(bus.journal().is_empty());
    }
}
