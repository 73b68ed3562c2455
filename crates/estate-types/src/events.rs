//! Domain events published on the event bus.
//!
//! Every event has a `namespace:name` topic (e.g. `tenant:rent_paid`) and a
//! typed details payload. On the wire an event serializes as
//! `{"topic": "...", "details": {...}}`, so the presentation layer can
//! switch on the same topic strings the bus uses for subscriptions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::achievement::AchievementTier;
use crate::ids::{
    AchievementId, ComplaintId, MarketEventId, MissionId, NotificationId, PlayerId, ProductId,
    PropertyId, TenantId,
};
use crate::market::{MarketEventKind, ProductCategory};
use crate::mission::MissionDifficulty;
use crate::notification::ChannelKind;
use crate::player::{ResourceDelta, Resources, RewardGrant};
use crate::property::PropertyKind;
use crate::tenant::ComplaintKind;
use crate::time::GamePhase;

// ---------------------------------------------------------------------------
// Tenant details
// ---------------------------------------------------------------------------

/// Why a tenant left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    /// Too many consecutive missed payments.
    Eviction,
    /// Satisfaction reached zero.
    MoveOut,
    /// Removed by the player.
    Manual,
}

/// Details for `tenant:added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TenantAddedDetails {
    /// New tenant.
    pub tenant_id: TenantId,
    /// Property moved into.
    pub property_id: PropertyId,
    /// Tenant name.
    pub name: String,
}

/// Details for `tenant:removed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TenantRemovedDetails {
    /// Departed tenant.
    pub tenant_id: TenantId,
    /// Property left.
    pub property_id: PropertyId,
    /// Tenant name.
    pub name: String,
    /// Why the tenant left.
    pub reason: RemovalReason,
}

/// Details for `tenant:satisfaction_changed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SatisfactionChangedDetails {
    /// Tenant concerned.
    pub tenant_id: TenantId,
    /// Tenant name.
    pub name: String,
    /// Value before the update.
    pub previous: f64,
    /// Value after the update.
    pub current: f64,
}

/// Details for `tenant:rent_paid` and `tenant:rent_missed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RentDetails {
    /// Paying tenant.
    pub tenant_id: TenantId,
    /// Tenant name.
    pub name: String,
    /// Property the rent is for.
    pub property_id: PropertyId,
    /// Amount due.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Simulated day the rent was due.
    pub day: u64,
    /// Missed payments in a row after this decision.
    pub consecutive_misses: u32,
}

/// Details for `tenant:positive_interaction` and `tenant:negative_interaction`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InteractionDetails {
    /// Property where the interaction happened.
    pub property_id: PropertyId,
    /// First tenant.
    pub first: TenantId,
    /// Second tenant.
    pub second: TenantId,
    /// Names of both tenants, in the same order.
    pub names: (String, String),
    /// Compatibility score in `[0, 100]`.
    pub score: f64,
    /// Relationship strength change applied to both sides.
    pub relationship_change: i32,
}

/// Details for `tenant:complaint_filed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ComplaintDetails {
    /// Complaining tenant.
    pub tenant_id: TenantId,
    /// Property concerned.
    pub property_id: PropertyId,
    /// Complaint identifier.
    pub complaint_id: ComplaintId,
    /// Subject.
    pub kind: ComplaintKind,
}

// ---------------------------------------------------------------------------
// Property details
// ---------------------------------------------------------------------------

/// Details for `property:added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PropertyAddedDetails {
    /// New property.
    pub property_id: PropertyId,
    /// Display name.
    pub name: String,
    /// Kind of building.
    pub kind: PropertyKind,
    /// Price paid.
    #[ts(as = "String")]
    pub purchase_price: Decimal,
}

/// Details for `property:maintained`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MaintenanceDetails {
    /// Maintained property.
    pub property_id: PropertyId,
    /// Condition before.
    pub condition_before: f64,
    /// Condition after.
    pub condition_after: f64,
    /// Currency spent.
    #[ts(as = "String")]
    pub cost: Decimal,
}

/// Details for `property:needs_maintenance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MaintenanceNeededDetails {
    /// Property concerned.
    pub property_id: PropertyId,
    /// Display name.
    pub name: String,
    /// Current condition.
    pub condition: f64,
}

// ---------------------------------------------------------------------------
// Market details
// ---------------------------------------------------------------------------

/// Details for `market:trends_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrendsUpdatedDetails {
    /// Simulated day.
    pub day: u64,
    /// Number of trends still active.
    pub active_trends: u32,
    /// Current price index.
    pub price_index: f64,
}

/// Details for `market:event_occurred`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MarketEventDetails {
    /// Event identifier.
    pub event_id: MarketEventId,
    /// Kind of event.
    pub kind: MarketEventKind,
    /// Affected category.
    pub category: ProductCategory,
    /// Price multiplier while active.
    pub impact: f64,
    /// Duration in days.
    pub duration_days: u64,
    /// Short description.
    pub description: String,
}

/// Details for `market:supplier_prices_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PricesUpdatedDetails {
    /// Tick of the update.
    pub tick: u64,
    /// Number of products repriced.
    pub products: u32,
    /// Price index after the update.
    pub price_index: f64,
}

/// Details for `market:item_purchased`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PurchaseDetails {
    /// Product bought.
    pub product_id: ProductId,
    /// Product category.
    pub category: ProductCategory,
    /// Inventory key credited.
    pub item_key: String,
    /// Units bought.
    pub quantity: u32,
    /// Total price paid.
    #[ts(as = "String")]
    pub total_cost: Decimal,
}

// ---------------------------------------------------------------------------
// Exploration details
// ---------------------------------------------------------------------------

/// Details for `exploration:mission_available`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionAvailableDetails {
    /// New mission.
    pub mission_id: MissionId,
    /// Display name.
    pub name: String,
    /// Difficulty tier.
    pub difficulty: MissionDifficulty,
}

/// Details for `exploration:started`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionStartedDetails {
    /// Started mission.
    pub mission_id: MissionId,
    /// Display name.
    pub name: String,
    /// Simulated instant the mission may be completed.
    pub estimated_end: DateTime<Utc>,
}

/// Details for `exploration:completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionCompletedDetails {
    /// Resolved mission.
    pub mission_id: MissionId,
    /// Display name.
    pub name: String,
    /// Whether the success roll passed.
    pub success: bool,
    /// Whether bonus loot dropped.
    pub bonus_loot: bool,
    /// Rewards to credit to the player.
    pub grant: RewardGrant,
}

/// Details for `exploration:expired`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionExpiredDetails {
    /// Expired mission.
    pub mission_id: MissionId,
    /// Display name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Achievement, notification, player, and game details
// ---------------------------------------------------------------------------

/// Details for `achievement:completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementCompletedDetails {
    /// Player who completed it.
    pub player_id: PlayerId,
    /// Achievement completed.
    pub achievement_id: AchievementId,
    /// Display name.
    pub name: String,
    /// Rarity tier.
    pub tier: AchievementTier,
}

/// Details for `achievement:claimed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementClaimedDetails {
    /// Player who claimed it.
    pub player_id: PlayerId,
    /// Achievement claimed.
    pub achievement_id: AchievementId,
    /// Rewards handed out.
    pub rewards: RewardGrant,
}

/// Details for `notification:delivered`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeliveredDetails {
    /// Notification delivered.
    pub notification_id: NotificationId,
    /// Channel used.
    pub channel: ChannelKind,
}

/// Details for `notification:delivery_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeliveryFailedDetails {
    /// Notification concerned.
    pub notification_id: NotificationId,
    /// Channel that failed.
    pub channel: ChannelKind,
    /// Failure message.
    pub error: String,
}

/// Details for `player:level_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LevelUpDetails {
    /// Player concerned.
    pub player_id: PlayerId,
    /// Level before.
    pub previous_level: u32,
    /// Level after.
    pub new_level: u32,
}

/// Details for `player:resources_changed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourcesChangedDetails {
    /// Player concerned.
    pub player_id: PlayerId,
    /// Change applied.
    pub delta: ResourceDelta,
    /// Balances after the change.
    pub resources: Resources,
}

/// Details for `game:saved` and `game:loaded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaveSlotDetails {
    /// Save slot key.
    pub slot: String,
    /// Tick at which the state was captured.
    pub tick: u64,
}

/// Details for `game:save_failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SaveFailedDetails {
    /// Save slot key.
    pub slot: String,
    /// Failure message.
    pub error: String,
}

/// Details for `game:phase_changed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhaseChangedDetails {
    /// Phase before.
    pub previous: GamePhase,
    /// Phase after.
    pub current: GamePhase,
}

/// Details for `game:day_passed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DayPassedDetails {
    /// New simulated day.
    pub day: u64,
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// Every event the simulation publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "topic", content = "details")]
pub enum GameEvent {
    /// A tenant moved in.
    #[serde(rename = "tenant:added")]
    TenantAdded(TenantAddedDetails),
    /// A tenant left.
    #[serde(rename = "tenant:removed")]
    TenantRemoved(TenantRemovedDetails),
    /// A tenant's satisfaction changed.
    #[serde(rename = "tenant:satisfaction_changed")]
    SatisfactionChanged(SatisfactionChangedDetails),
    /// Rent was paid.
    #[serde(rename = "tenant:rent_paid")]
    RentPaid(RentDetails),
    /// Rent was missed.
    #[serde(rename = "tenant:rent_missed")]
    RentMissed(RentDetails),
    /// Two tenants got along.
    #[serde(rename = "tenant:positive_interaction")]
    PositiveInteraction(InteractionDetails),
    /// Two tenants clashed.
    #[serde(rename = "tenant:negative_interaction")]
    NegativeInteraction(InteractionDetails),
    /// A tenant filed a complaint.
    #[serde(rename = "tenant:complaint_filed")]
    ComplaintFiled(ComplaintDetails),
    /// A property was acquired.
    #[serde(rename = "property:added")]
    PropertyAdded(PropertyAddedDetails),
    /// A property was maintained.
    #[serde(rename = "property:maintained")]
    PropertyMaintained(MaintenanceDetails),
    /// A property's condition fell below the maintenance threshold.
    #[serde(rename = "property:needs_maintenance")]
    MaintenanceNeeded(MaintenanceNeededDetails),
    /// Daily trend decay finished.
    #[serde(rename = "market:trends_updated")]
    TrendsUpdated(TrendsUpdatedDetails),
    /// A market event began.
    #[serde(rename = "market:event_occurred")]
    MarketEventOccurred(MarketEventDetails),
    /// Product prices were repriced.
    #[serde(rename = "market:supplier_prices_updated")]
    PricesUpdated(PricesUpdatedDetails),
    /// The player bought an item.
    #[serde(rename = "market:item_purchased")]
    ItemPurchased(PurchaseDetails),
    /// A new mission was generated.
    #[serde(rename = "exploration:mission_available")]
    MissionAvailable(MissionAvailableDetails),
    /// A mission started.
    #[serde(rename = "exploration:started")]
    MissionStarted(MissionStartedDetails),
    /// A mission was resolved.
    #[serde(rename = "exploration:completed")]
    MissionCompleted(MissionCompletedDetails),
    /// A mission expired.
    #[serde(rename = "exploration:expired")]
    MissionExpired(MissionExpiredDetails),
    /// An achievement was completed.
    #[serde(rename = "achievement:completed")]
    AchievementCompleted(AchievementCompletedDetails),
    /// An achievement reward was claimed.
    #[serde(rename = "achievement:claimed")]
    AchievementClaimed(AchievementClaimedDetails),
    /// A notification was delivered on one channel.
    #[serde(rename = "notification:delivered")]
    NotificationDelivered(DeliveredDetails),
    /// Delivery failed on one channel.
    #[serde(rename = "notification:delivery_failed")]
    NotificationDeliveryFailed(DeliveryFailedDetails),
    /// The player gained a level.
    #[serde(rename = "player:level_up")]
    LevelUp(LevelUpDetails),
    /// The player's resources changed.
    #[serde(rename = "player:resources_changed")]
    ResourcesChanged(ResourcesChangedDetails),
    /// The game was saved.
    #[serde(rename = "game:saved")]
    GameSaved(SaveSlotDetails),
    /// Saving failed.
    #[serde(rename = "game:save_failed")]
    SaveFailed(SaveFailedDetails),
    /// A save was loaded.
    #[serde(rename = "game:loaded")]
    GameLoaded(SaveSlotDetails),
    /// The game phase changed.
    #[serde(rename = "game:phase_changed")]
    PhaseChanged(PhaseChangedDetails),
    /// A simulated day rolled over.
    #[serde(rename = "game:day_passed")]
    DayPassed(DayPassedDetails),
}

impl GameEvent {
    /// The `namespace:name` topic of this event.
    pub const fn topic(&self) -> &'static str {
        match self {
            Self::TenantAdded(_) => "tenant:added",
            Self::TenantRemoved(_) => "tenant:removed",
            Self::SatisfactionChanged(_) => "tenant:satisfaction_changed",
            Self::RentPaid(_) => "tenant:rent_paid",
            Self::RentMissed(_) => "tenant:rent_missed",
            Self::PositiveInteraction(_) => "tenant:positive_interaction",
            Self::NegativeInteraction(_) => "tenant:negative_interaction",
            Self::ComplaintFiled(_) => "tenant:complaint_filed",
            Self::PropertyAdded(_) => "property:added",
            Self::PropertyMaintained(_) => "property:maintained",
            Self::MaintenanceNeeded(_) => "property:needs_maintenance",
            Self::TrendsUpdated(_) => "market:trends_updated",
            Self::MarketEventOccurred(_) => "market:event_occurred",
            Self::PricesUpdated(_) => "market:supplier_prices_updated",
            Self::ItemPurchased(_) => "market:item_purchased",
            Self::MissionAvailable(_) => "exploration:mission_available",
            Self::MissionStarted(_) => "exploration:started",
            Self::MissionCompleted(_) => "exploration:completed",
            Self::MissionExpired(_) => "exploration:expired",
            Self::AchievementCompleted(_) => "achievement:completed",
            Self::AchievementClaimed(_) => "achievement:claimed",
            Self::NotificationDelivered(_) => "notification:delivered",
            Self::NotificationDeliveryFailed(_) => "notification:delivery_failed",
            Self::LevelUp(_) => "player:level_up",
            Self::ResourcesChanged(_) => "player:resources_changed",
            Self::GameSaved(_) => "game:saved",
            Self::SaveFailed(_) => "game:save_failed",
            Self::GameLoaded(_) => "game:loaded",
            Self::PhaseChanged(_) => "game:phase_changed",
            Self::DayPassed(_) => "game:day_passed",
        }
    }

    /// The namespace part of the topic (before the colon).
    pub fn namespace(&self) -> &'static str {
        let topic = self.topic();
        topic.split_once(':').map_or(topic, |(ns, _)| ns)
    }
}
