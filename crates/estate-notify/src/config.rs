//! Notification defaults, loaded from the `notifications` section of
//! `estate-config.yaml`.

use estate_types::{ChannelKind, NotificationSettings, NotificationType, QuietHours};
use serde::Deserialize;

/// Defaults applied when a player's settings are first created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Channels enabled for every notification type.
    #[serde(default = "default_channels")]
    pub default_channels: Vec<ChannelKind>,
    /// Types that start with no channels at all.
    #[serde(default)]
    pub disabled_types: Vec<NotificationType>,
    /// Window in which only urgent notifications go out.
    #[serde(default)]
    pub quiet_hours: Option<QuietHours>,
    /// Notifications kept per player before the oldest are evicted.
    #[serde(default = "default_max_notifications")]
    pub max_notifications: u32,
    /// Read or unread notifications older than this are archived (0 disables).
    #[serde(default = "default_auto_archive_after_days")]
    pub auto_archive_after_days: u32,
    /// Notifications expire this many days after creation (0 disables).
    #[serde(default = "default_expire_after_days")]
    pub expire_after_days: u32,
    /// Satisfaction below which a tenant is reported as unhappy.
    #[serde(default = "default_unhappy_threshold")]
    pub unhappy_threshold: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_channels: default_channels(),
            disabled_types: Vec::new(),
            quiet_hours: None,
            max_notifications: default_max_notifications(),
            auto_archive_after_days: default_auto_archive_after_days(),
            expire_after_days: default_expire_after_days(),
            unhappy_threshold: default_unhappy_threshold(),
        }
    }
}

impl NotificationConfig {
    /// Fresh per-player settings built from these defaults.
    pub fn player_settings(&self) -> NotificationSettings {
        NotificationSettings {
            channels: NotificationType::ALL
                .into_iter()
                .map(|kind| {
                    let channels = if self.disabled_types.contains(&kind) {
                        Vec::new()
                    } else {
                        self.default_channels.clone()
                    };
                    (kind, channels)
                })
                .collect(),
            quiet_hours: self.quiet_hours,
            max_notifications: self.max_notifications,
            auto_archive_after_days: self.auto_archive_after_days,
        }
    }
}

fn default_channels() -> Vec<ChannelKind> {
    vec![ChannelKind::InApp]
}
const fn default_max_notifications() -> u32 {
    100
}
const fn default_auto_archive_after_days() -> u32 {
    7
}
const fn default_expire_after_days() -> u32 {
    30
}
const fn default_unhappy_threshold() -> u32 {
    20
}
