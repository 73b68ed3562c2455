//! The notification pipeline.
//!
//! [`NotificationEngine`] owns the template registry and the delivery
//! channels. The notifications themselves and per-player settings live in
//! the [`NotificationInbox`] inside the game state; every operation takes
//! the inbox and the bus explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use estate_events::EventBus;
use estate_types::events::{DeliveredDetails, DeliveryFailedDetails};
use estate_types::{
    ChannelKind, DeliveryRecord, GameEvent, Notification, NotificationId, NotificationInbox,
    NotificationPriority, NotificationSettings, NotificationStatus, NotificationType, PlayerId,
    PlayerProfile, TemplateId,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::channel::{DeliveryChannel, InAppChannel, LogChannel};
use crate::config::NotificationConfig;
use crate::error::{DeliveryError, NotificationError};
use crate::templates::{NotificationTemplate, TemplateRegistry, ids};

/// A notification to send, already rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    /// Recipient.
    pub player_id: PlayerId,
    /// Type, used for channel opt-in.
    pub kind: NotificationType,
    /// Urgency.
    pub priority: NotificationPriority,
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Structured payload.
    pub data: serde_json::Value,
}

/// What happened to a send request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Stored in the inbox and handed to every enabled channel.
    Delivered(NotificationId),
    /// The player has no channels enabled for this type.
    Disabled,
    /// Non-urgent notification during quiet hours; dropped.
    SuppressedQuietHours,
}

/// Counts from one [`NotificationEngine::sweep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Moved to archived because of age.
    pub archived: usize,
    /// Removed because they expired.
    pub expired: usize,
    /// Removed because they were deleted.
    pub purged: usize,
}

/// Renders, filters, stores, and delivers notifications.
pub struct NotificationEngine {
    config: NotificationConfig,
    templates: TemplateRegistry,
    channels: BTreeMap<ChannelKind, Box<dyn DeliveryChannel>>,
}

impl core::fmt::Debug for NotificationEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NotificationEngine")
            .field("config", &self.config)
            .field("templates", &self.templates)
            .field("channels", &self.channels.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NotificationEngine {
    /// Create an engine with the built-in templates, the in-app channel,
    /// and log-backed push, email, and SMS channels.
    pub fn new(config: NotificationConfig) -> Result<Self, NotificationError> {
        let mut engine = Self {
            config,
            templates: TemplateRegistry::with_builtins()?,
            channels: BTreeMap::new(),
        };
        engine.register_channel(Box::new(InAppChannel::new()));
        for kind in [ChannelKind::Push, ChannelKind::Email, ChannelKind::Sms] {
            engine.register_channel(Box::new(LogChannel::new(kind)));
        }
        Ok(engine)
    }

    /// The configuration in use.
    pub const fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Replace the channels that new player settings start with.
    ///
    /// Players whose settings already exist keep them.
    pub fn set_default_channels(&mut self, channels: Vec<ChannelKind>) {
        self.config.default_channels = channels;
    }

    /// Add or replace a template.
    pub fn register_template(&mut self, template: NotificationTemplate) -> Result<(), NotificationError> {
        self.templates.register(template)
    }

    /// Add or replace the implementation of a channel.
    pub fn register_channel(&mut self, channel: Box<dyn DeliveryChannel>) {
        self.channels.insert(channel.kind(), channel);
    }

    /// The player's settings, created from the configured defaults on first use.
    pub fn settings_for<'i>(
        &self,
        inbox: &'i mut NotificationInbox,
        player: PlayerId,
    ) -> &'i mut NotificationSettings {
        inbox
            .settings
            .entry(player)
            .or_insert_with(|| self.config.player_settings())
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    /// Run the send pipeline for an already rendered notification.
    pub fn send_notification(
        &mut self,
        inbox: &mut NotificationInbox,
        bus: &mut EventBus,
        request: NotificationRequest,
        now: DateTime<Utc>,
    ) -> SendOutcome {
        let settings = self.settings_for(inbox, request.player_id).clone();
        let channels = settings.enabled_channels(request.kind).to_vec();
        if channels.is_empty() {
            debug!(kind = ?request.kind, player_id = %request.player_id, "notification type disabled");
            return SendOutcome::Disabled;
        }
        if request.priority != NotificationPriority::Urgent
            && settings
                .quiet_hours
                .is_some_and(|window| window.contains(now.hour()))
        {
            debug!(kind = ?request.kind, hour = now.hour(), "suppressed during quiet hours");
            return SendOutcome::SuppressedQuietHours;
        }

        let expires_at = (self.config.expire_after_days > 0)
            .then(|| now + Duration::days(i64::from(self.config.expire_after_days)));
        let mut notification = Notification {
            id: NotificationId::new(),
            player_id: request.player_id,
            kind: request.kind,
            priority: request.priority,
            channels: channels.clone(),
            title: request.title,
            message: request.message,
            data: request.data,
            status: NotificationStatus::Unread,
            created_at: now,
            read_at: None,
            archived_at: None,
            expires_at,
            deliveries: Vec::with_capacity(channels.len()),
        };

        let mut events = Vec::with_capacity(channels.len());
        for channel in channels {
            let result = self
                .channels
                .get_mut(&channel)
                .ok_or(DeliveryError::NotRegistered(channel))
                .and_then(|c| c.deliver(&notification));
            let record = match result {
                Ok(()) => {
                    events.push(GameEvent::NotificationDelivered(DeliveredDetails {
                        notification_id: notification.id,
                        channel,
                    }));
                    DeliveryRecord {
                        channel,
                        delivered: true,
                        error: None,
                        attempted_at: now,
                    }
                }
                Err(err) => {
                    warn!(
                        notification_id = %notification.id,
                        ?channel,
                        error = %err,
                        "notification delivery failed"
                    );
                    events.push(GameEvent::NotificationDeliveryFailed(DeliveryFailedDetails {
                        notification_id: notification.id,
                        channel,
                        error: err.to_string(),
                    }));
                    DeliveryRecord {
                        channel,
                        delivered: false,
                        error: Some(err.to_string()),
                        attempted_at: now,
                    }
                }
            };
            notification.deliveries.push(record);
        }

        let id = notification.id;
        let player = notification.player_id;
        inbox.notifications.insert(id, notification);
        evict_oldest(inbox, player, settings.max_notifications, id);
        for event in events {
            bus.emit(event);
        }
        SendOutcome::Delivered(id)
    }

    /// Render template `template_id` with `vars` and send it to `player`.
    pub fn send_template_notification(
        &mut self,
        inbox: &mut NotificationInbox,
        bus: &mut EventBus,
        player: PlayerId,
        template_id: &TemplateId,
        vars: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<SendOutcome, NotificationError> {
        let rendered = self.templates.render(template_id, &vars)?;
        let request = NotificationRequest {
            player_id: player,
            kind: rendered.kind,
            priority: rendered.priority,
            title: rendered.title,
            message: rendered.message,
            data: vars,
        };
        Ok(self.send_notification(inbox, bus, request, now))
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Mark one notification read. Reading a read notification is a no-op.
    pub fn mark_read(
        &self,
        inbox: &mut NotificationInbox,
        id: NotificationId,
        now: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let notification = lookup(inbox, id)?;
        match notification.status {
            NotificationStatus::Unread => {
                notification.status = NotificationStatus::Read;
                notification.read_at = Some(now);
                Ok(())
            }
            NotificationStatus::Read => Ok(()),
            from => Err(NotificationError::InvalidTransition {
                id,
                from,
                to: NotificationStatus::Read,
            }),
        }
    }

    /// Move a read or unread notification to the archive.
    pub fn archive(
        &self,
        inbox: &mut NotificationInbox,
        id: NotificationId,
        now: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let notification = lookup(inbox, id)?;
        match notification.status {
            NotificationStatus::Unread | NotificationStatus::Read => {
                notification.status = NotificationStatus::Archived;
                notification.archived_at = Some(now);
                Ok(())
            }
            from => Err(NotificationError::InvalidTransition {
                id,
                from,
                to: NotificationStatus::Archived,
            }),
        }
    }

    /// Mark a notification deleted. It is purged by the next sweep.
    pub fn delete(&self, inbox: &mut NotificationInbox, id: NotificationId) -> Result<(), NotificationError> {
        let notification = lookup(inbox, id)?;
        if notification.status == NotificationStatus::Deleted {
            return Err(NotificationError::InvalidTransition {
                id,
                from: NotificationStatus::Deleted,
                to: NotificationStatus::Deleted,
            });
        }
        notification.status = NotificationStatus::Deleted;
        Ok(())
    }

    /// Mark every unread notification of `player` read. Returns how many changed.
    pub fn mark_all_read(&self, inbox: &mut NotificationInbox, player: PlayerId, now: DateTime<Utc>) -> usize {
        let mut changed = 0_usize;
        for notification in inbox
            .notifications
            .values_mut()
            .filter(|n| n.player_id == player && n.status == NotificationStatus::Unread)
        {
            notification.status = NotificationStatus::Read;
            notification.read_at = Some(now);
            changed = changed.saturating_add(1);
        }
        changed
    }

    /// Archive old notifications, drop expired ones, and purge deleted ones.
    pub fn sweep(&self, inbox: &mut NotificationInbox, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();
        let settings = inbox.settings.clone();
        let default_days = self.config.auto_archive_after_days;

        inbox.notifications.retain(|_, n| {
            if n.status == NotificationStatus::Deleted {
                report.purged = report.purged.saturating_add(1);
                return false;
            }
            if n.expires_at.is_some_and(|at| at <= now) {
                report.expired = report.expired.saturating_add(1);
                return false;
            }
            let days = settings
                .get(&n.player_id)
                .map_or(default_days, |s| s.auto_archive_after_days);
            let archivable = matches!(n.status, NotificationStatus::Unread | NotificationStatus::Read);
            if days > 0 && archivable && now - n.created_at >= Duration::days(i64::from(days)) {
                n.status = NotificationStatus::Archived;
                n.archived_at = Some(now);
                report.archived = report.archived.saturating_add(1);
            }
            true
        });

        if report != SweepReport::default() {
            info!(
                archived = report.archived,
                expired = report.expired,
                purged = report.purged,
                "notification sweep"
            );
        }
        report
    }

    // -----------------------------------------------------------------------
    // Event mapping
    // -----------------------------------------------------------------------

    /// Send the notification a game event calls for, if any.
    ///
    /// Returns `Ok(None)` for events that do not notify.
    pub fn handle_event(
        &mut self,
        inbox: &mut NotificationInbox,
        bus: &mut EventBus,
        event: &GameEvent,
        player: &PlayerProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<SendOutcome>, NotificationError> {
        let Some((template, vars)) = self.template_for(event, player) else {
            return Ok(None);
        };
        self.send_template_notification(inbox, bus, player.id, &TemplateId::new(template), vars, now)
            .map(Some)
    }

    fn template_for(&self, event: &GameEvent, player: &PlayerProfile) -> Option<(&'static str, serde_json::Value)> {
        let threshold = f64::from(self.config.unhappy_threshold);
        let mapped = match event {
            GameEvent::AchievementCompleted(d) => (
                ids::ACHIEVEMENT_UNLOCKED,
                json!({ "name": d.name, "tier": d.tier, "achievement_id": d.achievement_id }),
            ),
            GameEvent::RentMissed(d) => (
                ids::RENT_MISSED,
                json!({
                    "tenant": d.name,
                    "tenant_id": d.tenant_id,
                    "amount": d.amount.round_dp(2).to_string(),
                    "misses": d.consecutive_misses,
                }),
            ),
            GameEvent::NegativeInteraction(d) => (
                ids::TENANT_CONFLICT,
                json!({ "first": d.names.0, "second": d.names.1, "property_id": d.property_id }),
            ),
            GameEvent::SatisfactionChanged(d) if d.previous >= threshold && d.current < threshold => (
                ids::TENANT_UNHAPPY,
                json!({
                    "tenant": d.name,
                    "tenant_id": d.tenant_id,
                    "satisfaction": format!("{:.0}", d.current),
                }),
            ),
            GameEvent::MaintenanceNeeded(d) => (
                ids::MAINTENANCE_NEEDED,
                json!({
                    "property": d.name,
                    "property_id": d.property_id,
                    "condition": format!("{:.0}", d.condition),
                }),
            ),
            GameEvent::MarketEventOccurred(d) => (
                ids::MARKET_EVENT,
                json!({ "description": d.description, "days": d.duration_days, "category": d.category }),
            ),
            GameEvent::LevelUp(d) => (
                ids::LEVEL_UP,
                json!({ "player": player.name, "level": d.new_level }),
            ),
            GameEvent::MissionCompleted(d) => (
                ids::MISSION_COMPLETE,
                json!({
                    "mission": d.name,
                    "mission_id": d.mission_id,
                    "success": d.success,
                    "currency": d.grant.currency.round_dp(2).to_string(),
                }),
            ),
            GameEvent::SaveFailed(d) => (
                ids::SAVE_FAILED,
                json!({ "slot": d.slot, "error": d.error }),
            ),
            _ => return None,
        };
        Some(mapped)
    }
}

fn lookup(inbox: &mut NotificationInbox, id: NotificationId) -> Result<&mut Notification, NotificationError> {
    inbox
        .notifications
        .get_mut(&id)
        .ok_or(NotificationError::UnknownNotification(id))
}

/// Remove the oldest notifications of `player` until at most `max` remain.
/// `keep` is never removed.
fn evict_oldest(inbox: &mut NotificationInbox, player: PlayerId, max: u32, keep: NotificationId) {
    let max = usize::try_from(max).unwrap_or(usize::MAX);
    let mut owned: Vec<(DateTime<Utc>, NotificationId)> = inbox
        .notifications
        .values()
        .filter(|n| n.player_id == player && n.id != keep)
        .map(|n| (n.created_at, n.id))
        .collect();
    let total = owned.len().saturating_add(1);
    if total <= max {
        return;
    }
    owned.sort_unstable();
    for (_, id) in owned.into_iter().take(total.saturating_sub(max)) {
        inbox.notifications.remove(&id);
        debug!(notification_id = %id, "evicted oldest notification");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use chrono::TimeZone;
    use estate_types::events::{SatisfactionChangedDetails, SaveFailedDetails};
    use estate_types::{QuietHours, TenantId};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap()
    }

    fn request(player: PlayerId, priority: NotificationPriority) -> NotificationRequest {
        NotificationRequest {
            player_id: player,
            kind: NotificationType::Maintenance,
            priority,
            title: String::from("Leak"),
            message: String::from("The roof leaks."),
            data: serde_json::Value::Null,
        }
    }

    struct BrokenChannel;

    impl DeliveryChannel for BrokenChannel {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Push
        }

        fn deliver(&mut self, _notification: &Notification) -> Result<(), DeliveryError> {
            Err(DeliveryError::Unavailable {
                channel: ChannelKind::Push,
                reason: String::from("gateway down"),
            })
        }
    }

    #[test]
    fn quiet_hours_suppress_all_but_urgent() {
        let config = NotificationConfig {
            quiet_hours: Some(QuietHours {
                start_hour: 22,
                end_hour: 7,
            }),
            ..NotificationConfig::default()
        };
        let mut engine = NotificationEngine::new(config).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerId::new();

        let normal = engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::High), at(23));
        assert_eq!(normal, SendOutcome::SuppressedQuietHours);
        assert!(inbox.notifications.is_empty());

        let urgent = engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Urgent), at(23));
        assert!(matches!(urgent, SendOutcome::Delivered(_)));

        let daytime = engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Low), at(12));
        assert!(matches!(daytime, SendOutcome::Delivered(_)));
        assert_eq!(inbox.unread_count(player), 2);
    }

    #[test]
    fn disabled_type_is_not_stored() {
        let config = NotificationConfig {
            disabled_types: vec![NotificationType::Maintenance],
            ..NotificationConfig::default()
        };
        let mut engine = NotificationEngine::new(config).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let outcome = engine.send_notification(
            &mut inbox,
            &mut bus,
            request(PlayerId::new(), NotificationPriority::Urgent),
            at(10),
        );
        assert_eq!(outcome, SendOutcome::Disabled);
        assert!(inbox.notifications.is_empty());
        assert!(bus.journal().is_empty());
    }

    #[test]
    fn retention_evicts_oldest() {
        let config = NotificationConfig {
            max_notifications: 3,
            ..NotificationConfig::default()
        };
        let mut engine = NotificationEngine::new(config).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerId::new();

        let mut sent = Vec::new();
        for hour in 8..13 {
            let outcome = engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Normal), at(hour));
            let SendOutcome::Delivered(id) = outcome else {
                panic!("expected delivery, got {outcome:?}");
            };
            sent.push(id);
        }
        let kept: Vec<_> = inbox.for_player(player).iter().map(|n| n.id).collect();
        assert_eq!(kept, sent.get(2..).unwrap().to_vec());
    }

    #[test]
    fn default_channels_apply_to_new_players_only() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let existing = PlayerId::new();
        engine.settings_for(&mut inbox, existing);

        engine.set_default_channels(vec![ChannelKind::InApp, ChannelKind::Email]);
        let newcomer = PlayerId::new();
        let outcome = engine.send_notification(
            &mut inbox,
            &mut bus,
            request(newcomer, NotificationPriority::Normal),
            at(10),
        );
        let SendOutcome::Delivered(id) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };
        let channels: Vec<_> = inbox
            .notifications
            .get(&id)
            .unwrap()
            .deliveries
            .iter()
            .map(|r| r.channel)
            .collect();
        assert_eq!(channels, vec![ChannelKind::InApp, ChannelKind::Email]);
        assert_eq!(
            engine
                .settings_for(&mut inbox, existing)
                .enabled_channels(NotificationType::Maintenance),
            [ChannelKind::InApp]
        );
    }

    #[test]
    fn failing_channel_does_not_block_others() {
        let config = NotificationConfig {
            default_channels: vec![ChannelKind::InApp, ChannelKind::Push, ChannelKind::Email],
            ..NotificationConfig::default()
        };
        let mut engine = NotificationEngine::new(config).unwrap();
        engine.register_channel(Box::new(BrokenChannel));
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();

        let outcome = engine.send_notification(
            &mut inbox,
            &mut bus,
            request(PlayerId::new(), NotificationPriority::Normal),
            at(10),
        );
        let SendOutcome::Delivered(id) = outcome else {
            panic!("expected delivery, got {outcome:?}");
        };
        let stored = inbox.notifications.get(&id).unwrap();
        let delivered: Vec<_> = stored
            .deliveries
            .iter()
            .map(|r| (r.channel, r.delivered))
            .collect();
        assert_eq!(
            delivered,
            vec![
                (ChannelKind::InApp, true),
                (ChannelKind::Push, false),
                (ChannelKind::Email, true),
            ]
        );
        let topics: Vec<_> = bus.journal().iter().map(GameEvent::topic).collect();
        assert_eq!(
            topics,
            vec![
                "notification:delivered",
                "notification:delivery_failed",
                "notification:delivered",
            ]
        );
    }

    #[test]
    fn status_transitions() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerId::new();
        let SendOutcome::Delivered(id) =
            engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Normal), at(9))
        else {
            panic!("expected delivery");
        };

        engine.mark_read(&mut inbox, id, at(10)).unwrap();
        engine.mark_read(&mut inbox, id, at(11)).unwrap();
        assert_eq!(inbox.notifications.get(&id).unwrap().read_at, Some(at(10)));

        engine.archive(&mut inbox, id, at(12)).unwrap();
        assert!(matches!(
            engine.archive(&mut inbox, id, at(12)),
            Err(NotificationError::InvalidTransition { .. })
        ));
        assert!(matches!(
            engine.mark_read(&mut inbox, id, at(12)),
            Err(NotificationError::InvalidTransition { .. })
        ));

        engine.delete(&mut inbox, id).unwrap();
        assert!(engine.delete(&mut inbox, id).is_err());
        assert!(matches!(
            engine.mark_read(&mut inbox, NotificationId::new(), at(12)),
            Err(NotificationError::UnknownNotification(_))
        ));
    }

    #[test]
    fn mark_all_read_only_touches_player() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let (alice, bob) = (PlayerId::new(), PlayerId::new());
        for player in [alice, alice, bob] {
            engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Normal), at(9));
        }
        assert_eq!(engine.mark_all_read(&mut inbox, alice, at(10)), 2);
        assert_eq!(inbox.unread_count(alice), 0);
        assert_eq!(inbox.unread_count(bob), 1);
    }

    #[test]
    fn sweep_archives_expires_and_purges() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerId::new();
        let start = at(9);

        let mut ids = Vec::new();
        for _ in 0..3 {
            if let SendOutcome::Delivered(id) =
                engine.send_notification(&mut inbox, &mut bus, request(player, NotificationPriority::Normal), start)
            {
                ids.push(id);
            }
        }
        engine.delete(&mut inbox, *ids.first().unwrap()).unwrap();

        let report = engine.sweep(&mut inbox, start + Duration::days(8));
        assert_eq!(
            report,
            SweepReport {
                archived: 2,
                expired: 0,
                purged: 1,
            }
        );

        let report = engine.sweep(&mut inbox, start + Duration::days(30));
        assert_eq!(report.expired, 2);
        assert!(inbox.notifications.is_empty());
    }

    #[test]
    fn unhappy_fires_only_on_crossing() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerProfile::new("Robin");
        let change = |previous: f64, current: f64| {
            GameEvent::SatisfactionChanged(SatisfactionChangedDetails {
                tenant_id: TenantId::new(),
                name: String::from("Ada"),
                previous,
                current,
            })
        };

        let crossing = engine
            .handle_event(&mut inbox, &mut bus, &change(25.0, 18.0), &player, at(10))
            .unwrap();
        assert!(matches!(crossing, Some(SendOutcome::Delivered(_))));
        let stored = inbox.for_player(player.id);
        let first = stored.first().unwrap();
        assert_eq!(first.priority, NotificationPriority::Urgent);
        assert_eq!(first.title, "Ada is unhappy");

        let already_low = engine
            .handle_event(&mut inbox, &mut bus, &change(18.0, 15.0), &player, at(10))
            .unwrap();
        assert_eq!(already_low, None);
    }

    #[test]
    fn save_failure_is_urgent() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let player = PlayerProfile::new("Robin");
        let event = GameEvent::SaveFailed(SaveFailedDetails {
            slot: String::from("autosave"),
            error: String::from("disk full"),
        });
        engine
            .handle_event(&mut inbox, &mut bus, &event, &player, at(3))
            .unwrap();
        let stored = inbox.for_player(player.id);
        let notification = stored.first().unwrap();
        assert_eq!(notification.kind, NotificationType::System);
        assert_eq!(notification.message, "Could not save to slot autosave: disk full");
    }

    #[test]
    fn unknown_template_is_an_error() {
        let mut engine = NotificationEngine::new(NotificationConfig::default()).unwrap();
        let mut inbox = NotificationInbox::default();
        let mut bus = EventBus::new();
        let result = engine.send_template_notification(
            &mut inbox,
            &mut bus,
            PlayerId::new(),
            &TemplateId::new("missing"),
            json!({}),
            at(10),
        );
        assert!(matches!(result, Err(NotificationError::UnknownTemplate(_))));
    }
}
