//! Notifications for the Estate simulation engine.
//!
//! - [`engine`] -- [`NotificationEngine`]: the send pipeline (render, opt-in,
//!   quiet hours, retention, per-channel delivery), status transitions,
//!   the archive sweep, and the mapping from game events to templates
//! - [`templates`] -- `minijinja` templates and the built-in set
//! - [`channel`] -- The [`DeliveryChannel`] trait and its implementations
//! - [`config`] -- [`NotificationConfig`] defaults for new players
//! - [`error`] -- [`NotificationError`] and [`DeliveryError`]

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod templates;

pub use channel::{DeliveryChannel, InAppChannel, LogChannel};
pub use config::NotificationConfig;
pub use engine::{NotificationEngine, NotificationRequest, SendOutcome, SweepReport};
pub use error::{DeliveryError, NotificationError};
pub use templates::{NotificationTemplate, Rendered, TemplateRegistry, builtin_templates};
