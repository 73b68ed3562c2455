//! Error types for the `estate-notify` crate.

use estate_types::{ChannelKind, NotificationId, NotificationStatus, TemplateId};

/// Failures of the notification API.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// No template is registered under this id.
    #[error("unknown template: {0}")]
    UnknownTemplate(TemplateId),

    /// No notification with this id exists.
    #[error("unknown notification: {0}")]
    UnknownNotification(NotificationId),

    /// The requested status change is not allowed.
    #[error("notification {id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        /// Notification concerned.
        id: NotificationId,
        /// Current status.
        from: NotificationStatus,
        /// Requested status.
        to: NotificationStatus,
    },

    /// A template failed to compile or render.
    #[error("template {template}: {reason}")]
    Template {
        /// Template name.
        template: String,
        /// Error reported by the template engine.
        reason: String,
    },
}

/// A single channel failed to deliver a notification.
///
/// Delivery errors never escape the send pipeline; they are logged,
/// recorded on the notification, and announced on the bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The channel cannot deliver right now.
    #[error("{channel:?} unavailable: {reason}")]
    Unavailable {
        /// Channel that failed.
        channel: ChannelKind,
        /// Why.
        reason: String,
    },

    /// No implementation is registered for the channel.
    #[error("no {0:?} channel registered")]
    NotRegistered(ChannelKind),
}
