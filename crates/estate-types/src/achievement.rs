//! Achievement definitions and per-player progress.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bounds::{clamp_percent, clamp_unit};
use crate::ids::{AchievementId, PlayerId};
use crate::player::RewardGrant;

/// Broad grouping used by the achievement screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    /// Owning and maintaining properties.
    Property,
    /// Housing and keeping tenants.
    Tenant,
    /// Money earned and held.
    Financial,
    /// Trading on the market.
    Market,
    /// Exploration missions.
    Exploration,
    /// Levels and play time.
    Progression,
}

/// Rarity tier; higher tiers carry larger rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AchievementTier {
    /// Entry level.
    Bronze,
    /// Intermediate.
    Silver,
    /// Advanced.
    Gold,
    /// Exceptional.
    Platinum,
}

/// A measurable quantity that achievements track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Total currency collected as rent.
    RentCollected,
    /// Number of rent payments received.
    RentPayments,
    /// Number of positive tenant interactions.
    PositiveInteractions,
    /// Number of missions resolved.
    MissionsCompleted,
    /// Number of missions resolved successfully.
    MissionsSucceeded,
    /// Number of items bought on the market.
    ItemsPurchased,
    /// Number of market events witnessed.
    MarketEventsWitnessed,
    /// Properties currently owned.
    PropertiesOwned,
    /// Tenants currently housed.
    TenantsHoused,
    /// Player level.
    PlayerLevel,
    /// Currency currently held.
    CurrencyHeld,
    /// Simulated days played.
    DaysPlayed,
}

impl ConditionKind {
    /// Whether the condition accumulates (counter) rather than tracking an absolute value.
    pub const fn is_counter(self) -> bool {
        matches!(
            self,
            Self::RentCollected
                | Self::RentPayments
                | Self::PositiveInteractions
                | Self::MissionsCompleted
                | Self::MissionsSucceeded
                | Self::ItemsPurchased
                | Self::MarketEventsWitnessed
        )
    }
}

/// One requirement of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementCondition {
    /// Tracked quantity.
    pub kind: ConditionKind,
    /// Value at which the condition is met.
    pub target: f64,
}

/// Immutable definition of an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementDefinition {
    /// Slug identifier.
    pub id: AchievementId,
    /// Display name.
    pub name: String,
    /// What the player has to do.
    pub description: String,
    /// Grouping.
    pub category: AchievementCategory,
    /// Rarity tier.
    pub tier: AchievementTier,
    /// All conditions must be met to complete.
    pub conditions: Vec<AchievementCondition>,
    /// Granted when claimed.
    pub rewards: RewardGrant,
    /// Hidden achievements are not listed until completed.
    pub hidden: bool,
}

/// Status of an achievement for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    /// No progress yet.
    Locked,
    /// Some progress.
    InProgress,
    /// Every condition met; reward unclaimed.
    Completed,
    /// Reward claimed.
    Claimed,
}

/// Progress towards one condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConditionProgress {
    /// Tracked quantity.
    pub kind: ConditionKind,
    /// Highest value seen.
    pub current: f64,
    /// Value at which the condition is met.
    pub target: f64,
}

impl ConditionProgress {
    /// Completion ratio `min(current / target, 1)`. A non-positive target counts as met.
    pub fn ratio(&self) -> f64 {
        if self.target <= 0.0 {
            return 1.0;
        }
        clamp_unit(self.current / self.target)
    }

    /// Whether the condition is met.
    pub fn is_met(&self) -> bool {
        self.current >= self.target
    }
}

/// One player's progress on one achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementProgress {
    /// Achievement tracked.
    pub achievement_id: AchievementId,
    /// Lifecycle status.
    pub status: AchievementStatus,
    /// Per-condition progress, in definition order.
    pub conditions: Vec<ConditionProgress>,
    /// Aggregate completion in `[0, 1]`.
    pub progress: f64,
    /// When progress first became nonzero.
    pub started_at: Option<DateTime<Utc>>,
    /// When every condition was first met.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the reward was claimed.
    pub claimed_at: Option<DateTime<Utc>>,
}

impl AchievementProgress {
    /// Fresh locked progress for `definition`.
    pub fn for_definition(definition: &AchievementDefinition) -> Self {
        Self {
            achievement_id: definition.id.clone(),
            status: AchievementStatus::Locked,
            conditions: definition
                .conditions
                .iter()
                .map(|c| ConditionProgress {
                    kind: c.kind,
                    current: 0.0,
                    target: c.target,
                })
                .collect(),
            progress: 0.0,
            started_at: None,
            completed_at: None,
            claimed_at: None,
        }
    }

    /// Aggregate completion as a percentage in `[0, 100]`.
    pub fn percent(&self) -> f64 {
        clamp_percent(self.progress * 100.0)
    }
}

/// Achievement definitions and all player progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AchievementBook {
    /// Definitions by id.
    pub definitions: BTreeMap<AchievementId, AchievementDefinition>,
    /// Progress by player, then achievement.
    pub progress: BTreeMap<PlayerId, BTreeMap<AchievementId, AchievementProgress>>,
    /// Accumulated counters by player, then condition.
    pub counters: BTreeMap<PlayerId, BTreeMap<ConditionKind, f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_is_capped() {
        let condition = ConditionProgress {
            kind: ConditionKind::RentPayments,
            current: 15.0,
            target: 10.0,
        };
        assert!((condition.ratio() - 1.0).abs() < f64::EPSILON);
        assert!(condition.is_met());
    }

    #[test]
    fn zero_target_counts_as_met() {
        let condition = ConditionProgress {
            kind: ConditionKind::DaysPlayed,
            current: 0.0,
            target: 0.0,
        };
        assert!((condition.ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counter_kinds() {
        assert!(ConditionKind::RentCollected.is_counter());
        assert!(!ConditionKind::PlayerLevel.is_counter());
    }
}
