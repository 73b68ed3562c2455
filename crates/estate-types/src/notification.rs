//! Notifications, delivery records, and per-player settings.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{NotificationId, PlayerId};

/// What a notification is about. Channel opt-in is configured per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// An achievement was unlocked.
    Achievement,
    /// A tenant missed rent.
    RentMissed,
    /// Two tenants clashed.
    TenantConflict,
    /// A tenant's satisfaction is critically low.
    TenantUnhappy,
    /// A property needs maintenance.
    Maintenance,
    /// A market event began.
    MarketEvent,
    /// The player reached a new level.
    LevelUp,
    /// A mission was resolved.
    MissionComplete,
    /// Engine-level messages (save failures).
    System,
}

impl NotificationType {
    /// Every type, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Achievement,
        Self::RentMissed,
        Self::TenantConflict,
        Self::TenantUnhappy,
        Self::Maintenance,
        Self::MarketEvent,
        Self::LevelUp,
        Self::MissionComplete,
        Self::System,
    ];
}

/// Urgency of a notification. Only `Urgent` bypasses quiet hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    /// Informational.
    Low,
    /// Default.
    Normal,
    /// Needs attention soon.
    High,
    /// Needs attention now.
    Urgent,
}

/// A delivery medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// The in-game inbox.
    InApp,
    /// Mobile push.
    Push,
    /// Email.
    Email,
    /// Text message.
    Sms,
}

/// Lifecycle status of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Not yet seen.
    Unread,
    /// Seen.
    Read,
    /// Moved out of the main inbox.
    Archived,
    /// Marked for purge.
    Deleted,
}

/// Outcome of delivering on one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeliveryRecord {
    /// Channel attempted.
    pub channel: ChannelKind,
    /// Whether delivery succeeded.
    pub delivered: bool,
    /// Failure message, if any.
    pub error: Option<String>,
    /// Simulated instant of the attempt.
    pub attempted_at: DateTime<Utc>,
}

/// A rendered notification in a player's inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Notification {
    /// Notification identifier.
    pub id: NotificationId,
    /// Recipient.
    pub player_id: PlayerId,
    /// Notification type.
    pub kind: NotificationType,
    /// Urgency.
    pub priority: NotificationPriority,
    /// Channels delivery was attempted on.
    pub channels: Vec<ChannelKind>,
    /// Rendered title.
    pub title: String,
    /// Rendered body.
    pub message: String,
    /// Structured payload (template variables).
    pub data: serde_json::Value,
    /// Lifecycle status.
    pub status: NotificationStatus,
    /// Simulated creation instant.
    pub created_at: DateTime<Utc>,
    /// When the notification was first read.
    pub read_at: Option<DateTime<Utc>>,
    /// When the notification was archived.
    pub archived_at: Option<DateTime<Utc>>,
    /// After this instant the notification is deleted by the sweep.
    pub expires_at: Option<DateTime<Utc>>,
    /// One record per channel attempted.
    pub deliveries: Vec<DeliveryRecord>,
}

/// A daily window during which only urgent notifications are delivered.
///
/// `start_hour == end_hour` is an empty window. A window whose start is
/// after its end wraps midnight (e.g. 22 to 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct QuietHours {
    /// First quiet hour (0-23, inclusive).
    pub start_hour: u32,
    /// First non-quiet hour (0-23, exclusive).
    pub end_hour: u32,
}

impl QuietHours {
    /// Whether `hour` falls inside the window.
    pub const fn contains(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

/// A player's notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NotificationSettings {
    /// Enabled channels per type. A missing or empty entry disables the type.
    pub channels: BTreeMap<NotificationType, Vec<ChannelKind>>,
    /// Quiet-hours window, if any.
    pub quiet_hours: Option<QuietHours>,
    /// Maximum notifications kept; the oldest are evicted first.
    pub max_notifications: u32,
    /// Age in days after which read or unread notifications are archived.
    pub auto_archive_after_days: u32,
}

impl NotificationSettings {
    /// Channels enabled for `kind`.
    pub fn enabled_channels(&self, kind: NotificationType) -> &[ChannelKind] {
        self.channels
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// All notifications and settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NotificationInbox {
    /// Notifications by id.
    pub notifications: BTreeMap<NotificationId, Notification>,
    /// Settings by player, created on first use.
    pub settings: BTreeMap<PlayerId, NotificationSettings>,
}

impl NotificationInbox {
    /// Notifications addressed to `player`, oldest first, excluding deleted ones.
    pub fn for_player(&self, player: PlayerId) -> Vec<&Notification> {
        let mut list: Vec<&Notification> = self
            .notifications
            .values()
            .filter(|n| n.player_id == player && n.status != NotificationStatus::Deleted)
            .collect();
        list.sort_by_key(|n| (n.created_at, n.id));
        list
    }

    /// Number of unread notifications for `player`.
    pub fn unread_count(&self, player: PlayerId) -> usize {
        self.notifications
            .values()
            .filter(|n| n.player_id == player && n.status == NotificationStatus::Unread)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_hours_same_day() {
        let window = QuietHours {
            start_hour: 13,
            end_hour: 15,
        };
        assert!(window.contains(13));
        assert!(window.contains(14));
        assert!(!window.contains(15));
        assert!(!window.contains(2));
    }

    #[test]
    fn quiet_hours_wrap_midnight() {
        let window = QuietHours {
            start_hour: 22,
            end_hour: 7,
        };
        assert!(window.contains(23));
        assert!(window.contains(0));
        assert!(window.contains(6));
        assert!(!window.contains(7));
        assert!(!window.contains(12));
    }

    #[test]
    fn empty_window_never_matches() {
        let window = QuietHours {
            start_hour: 9,
            end_hour: 9,
        };
        assert!((0..24).all(|h| !window.contains(h)));
    }

    #[test]
    fn missing_type_has_no_channels() {
        let settings = NotificationSettings {
            channels: BTreeMap::new(),
            quiet_hours: None,
            max_notifications: 10,
            auto_archive_after_days: 7,
        };
        assert!(settings.enabled_channels(NotificationType::LevelUp).is_empty());
    }
}
