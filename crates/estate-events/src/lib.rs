//! Event bus and tick scheduler for the Estate simulation engine.
//!
//! - [`bus`] -- Synchronous pub/sub with topic patterns, handler isolation,
//!   an event journal, and a per-topic recursion guard
//! - [`scheduler`] -- Delay-based one-shot tasks, cancellable by id

pub mod bus;
pub mod scheduler;

pub use bus::{EventBus, Handler, HandlerError, HandlerId, TopicPattern};
pub use scheduler::Scheduler;
