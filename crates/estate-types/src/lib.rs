//! Shared type definitions for the Estate simulation engine.
//!
//! This crate is the single source of truth for the data model used across
//! the workspace. Types flow downstream to `TypeScript` via `ts-rs` for the
//! presentation layer.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID and slug wrappers for entity identifiers
//! - [`time`] -- Simulated clock, seasons, and game phase
//! - [`bounds`] -- Clamping helpers for percentages and strengths
//! - [`player`] -- Player profile, resources, rewards, leveling curve
//! - [`property`] -- Properties and occupancy
//! - [`tenant`] -- Tenants, personalities, relationships, payments, complaints
//! - [`market`] -- Vendors, products, indices, market events and trends
//! - [`mission`] -- Exploration missions and their state machine
//! - [`achievement`] -- Achievement definitions and per-player progress
//! - [`notification`] -- Notifications, delivery records, player settings
//! - [`events`] -- The [`GameEvent`] enum published on the event bus
//! - [`rejection`] -- Validation failures for player-facing operations
//! - [`state`] -- The [`GameState`] root aggregate

pub mod achievement;
pub mod bounds;
pub mod events;
pub mod ids;
pub mod market;
pub mod mission;
pub mod notification;
pub mod player;
pub mod property;
pub mod rejection;
pub mod state;
pub mod tenant;
pub mod time;

// Re-export the common types at crate root for convenience.
pub use achievement::{
    AchievementBook, AchievementCategory, AchievementCondition, AchievementDefinition,
    AchievementProgress, AchievementStatus, AchievementTier, ConditionKind, ConditionProgress,
};
pub use events::{GameEvent, RemovalReason};
pub use ids::{
    AchievementId, ComplaintId, MarketEventId, MissionId, NotificationId, PlayerId, ProductId,
    PropertyId, TaskId, TemplateId, TenantId, TrendId, VendorId,
};
pub use market::{
    ImpactTarget, MarketEvent, MarketEventKind, MarketIndices, MarketState, MarketTrend,
    PricePoint, Product, ProductCategory, Vendor,
};
pub use mission::{
    LootEntry, Mission, MissionDifficulty, MissionOutcome, MissionRequirements, MissionRewards,
    MissionRisk, MissionStatus,
};
pub use notification::{
    ChannelKind, DeliveryRecord, Notification, NotificationInbox, NotificationPriority,
    NotificationSettings, NotificationStatus, NotificationType, QuietHours,
};
pub use player::{ItemGrant, PlayerProfile, ResourceDelta, Resources, RewardGrant};
pub use property::{Property, PropertyKind};
pub use rejection::{Rejection, RejectionReason};
pub use state::{Difficulty, GameSettings, GameState, STATE_VERSION};
pub use tenant::{
    Complaint, ComplaintKind, DailySchedule, Financials, Lifestyle, PaymentRecord, PaymentStatus,
    PersonalityTrait, Preferences, Relationship, Tenant,
};
pub use time::{GamePhase, GameTime, Season};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes the bindings for a type and everything
        // it references into `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::state::GameState::export_all();
        let _ = crate::events::GameEvent::export_all();
        let _ = crate::rejection::Rejection::export_all();
        let _ = crate::achievement::AchievementStatus::export_all();
        let _ = crate::notification::NotificationStatus::export_all();
        let _ = crate::mission::MissionStatus::export_all();
    }
}
