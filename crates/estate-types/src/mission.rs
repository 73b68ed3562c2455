//! Exploration missions and their lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::MissionId;
use crate::player::RewardGrant;
use crate::rejection::{Rejection, RejectionReason};

/// Difficulty tier of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MissionDifficulty {
    /// Short and safe.
    Easy,
    /// Moderate length and risk.
    Medium,
    /// Long, risky, lucrative.
    Hard,
    /// Reserved for high-level players.
    Extreme,
}

impl MissionDifficulty {
    /// Every tier, easiest first.
    pub const ALL: [Self; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Extreme];
}

/// Lifecycle status of a mission.
///
/// Transitions only move forward:
/// `Available -> InProgress -> {Completed | Failed | Expired}` and
/// `Available -> Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Can be started.
    Available,
    /// Started and not yet resolved.
    InProgress,
    /// Resolved successfully by a completion roll.
    Completed,
    /// Failed or cancelled.
    Failed,
    /// Timed out before being started or resolved.
    Expired,
}

impl MissionStatus {
    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Expired)
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Available, Self::InProgress | Self::Expired)
                | (Self::InProgress, Self::Completed | Self::Failed | Self::Expired)
        )
    }
}

/// What a player needs to start a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionRequirements {
    /// Minimum player level.
    pub min_level: u32,
    /// Currency debited on start.
    #[ts(as = "String")]
    pub entry_cost: Decimal,
    /// Energy debited on start.
    pub energy_cost: u32,
    /// Inventory keys that must be held (not consumed).
    pub equipment: Vec<String>,
}

/// A possible item drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LootEntry {
    /// Inventory key.
    pub item_key: String,
    /// Quantity dropped.
    pub quantity: u32,
    /// Drop chance in `[0, 1]` on success.
    pub chance: f64,
}

/// Nominal rewards of a mission before the success roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionRewards {
    /// Nominal currency payout.
    #[ts(as = "String")]
    pub currency: Decimal,
    /// Nominal experience payout.
    pub experience: u64,
    /// Reputation gained on success.
    pub reputation: i64,
    /// Possible item drops.
    pub loot: Vec<LootEntry>,
}

/// A named hazard that lowers the success rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionRisk {
    /// Short name (e.g. `rockfall`).
    pub name: String,
    /// Probability in `[0, 1]`; half of it is subtracted from the success rate.
    pub probability: f64,
}

/// Result of a resolved mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MissionOutcome {
    /// Whether the success roll passed.
    pub success: bool,
    /// Whether the player cancelled the mission.
    pub cancelled: bool,
    /// Adjusted success rate the roll was made against.
    pub adjusted_rate: f64,
    /// Whether bonus loot dropped.
    pub bonus_loot: bool,
    /// Rewards granted.
    pub grant: RewardGrant,
    /// Simulated instant of resolution.
    pub resolved_at: DateTime<Utc>,
}

/// An exploration mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Mission {
    /// Mission identifier.
    pub id: MissionId,
    /// Display name.
    pub name: String,
    /// Where the mission takes place.
    pub location: String,
    /// Difficulty tier.
    pub difficulty: MissionDifficulty,
    /// Duration in simulated hours.
    pub duration_hours: u32,
    /// Base success rate in `(0, 1)`.
    pub success_rate: f64,
    /// Start requirements.
    pub requirements: MissionRequirements,
    /// Nominal rewards.
    pub rewards: MissionRewards,
    /// Hazards.
    pub risks: Vec<MissionRisk>,
    /// Lifecycle status.
    pub status: MissionStatus,
    /// Simulated day the mission was generated.
    pub created_day: u64,
    /// Day after which an unstarted mission expires.
    pub expires_day: u64,
    /// Simulated instant the mission started.
    pub started_at: Option<DateTime<Utc>>,
    /// Simulated instant the mission may be completed.
    pub estimated_end: Option<DateTime<Utc>>,
    /// Recorded result once resolved.
    pub outcome: Option<MissionOutcome>,
}

impl Mission {
    /// Move to `next`, refusing any transition that is not strictly forward.
    pub fn transition(&mut self, next: MissionStatus) -> Result<(), Rejection> {
        if !self.status.can_transition_to(next) {
            return Err(Rejection::new(
                RejectionReason::InvalidState,
                format!(
                    "mission {} cannot move from {:?} to {next:?}",
                    self.id, self.status
                ),
            ));
        }
        self.status = next;
        Ok(())
    }
}
