//! Delivery channels.
//!
//! In-app delivery is the inbox itself. Push, email, and SMS have no real
//! backend here; [`LogChannel`] stands in for them by writing the message
//! to the log.

use estate_types::{ChannelKind, Notification};
use tracing::info;

use crate::error::DeliveryError;

/// A medium notifications are delivered through.
pub trait DeliveryChannel: Send {
    /// Which channel this is.
    fn kind(&self) -> ChannelKind;

    /// Deliver one notification.
    fn deliver(&mut self, notification: &Notification) -> Result<(), DeliveryError>;
}

/// In-app delivery: the notification is already in the player's inbox.
#[derive(Debug, Default)]
pub struct InAppChannel {
    delivered: u64,
}

impl InAppChannel {
    /// Create the channel.
    pub const fn new() -> Self {
        Self { delivered: 0 }
    }

    /// Notifications delivered so far.
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl DeliveryChannel for InAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::InApp
    }

    fn deliver(&mut self, _notification: &Notification) -> Result<(), DeliveryError> {
        self.delivered = self.delivered.saturating_add(1);
        Ok(())
    }
}

/// Simulated external channel that logs each delivery.
#[derive(Debug)]
pub struct LogChannel {
    kind: ChannelKind,
}

impl LogChannel {
    /// A log-backed stand-in for `kind`.
    pub const fn new(kind: ChannelKind) -> Self {
        Self { kind }
    }
}

impl DeliveryChannel for LogChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn deliver(&mut self, notification: &Notification) -> Result<(), DeliveryError> {
        info!(
            channel = ?self.kind,
            notification_id = %notification.id,
            priority = ?notification.priority,
            title = %notification.title,
            "notification sent"
        );
        Ok(())
    }
}
