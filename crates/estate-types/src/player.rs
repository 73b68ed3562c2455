//! Player profile, resources, and leveling.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PlayerId;
use crate::rejection::{Rejection, RejectionReason};

/// Experience needed per squared level step (`100 * (level - 1)^2`).
const XP_CURVE_BASE: u64 = 100;

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 100;

/// Spendable and accumulated player resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Money available for rent-free purchases, mission fees, and upkeep.
    #[ts(as = "String")]
    pub currency: Decimal,
    /// Standing with tenants and vendors. May go negative.
    pub reputation: i64,
    /// Total experience earned. Never decreases.
    pub experience: u64,
    /// Energy spent by missions; capped at `max_energy`.
    pub energy: u32,
    /// Upper bound for `energy`.
    pub max_energy: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            currency: Decimal::new(10_000, 0),
            reputation: 0,
            experience: 0,
            energy: 100,
            max_energy: 100,
        }
    }
}

/// A signed change to apply to [`Resources`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDelta {
    /// Currency change (negative to spend).
    #[ts(as = "String")]
    pub currency: Decimal,
    /// Reputation change.
    pub reputation: i64,
    /// Experience gained. Negative values are ignored.
    pub experience: i64,
    /// Energy change, clamped to `0..=max_energy` when applied.
    pub energy: i64,
}

impl ResourceDelta {
    /// A delta that only moves currency.
    pub const fn currency(amount: Decimal) -> Self {
        Self {
            currency: amount,
            reputation: 0,
            experience: 0,
            energy: 0,
        }
    }
}

/// One item stack granted as a reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemGrant {
    /// Inventory key of the item (e.g. `climbing_rope`).
    pub item_key: String,
    /// Number of items granted.
    pub quantity: u32,
}

/// Concrete rewards handed to the player (mission payout, achievement claim).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RewardGrant {
    /// Currency credited.
    #[ts(as = "String")]
    pub currency: Decimal,
    /// Experience credited.
    pub experience: u64,
    /// Reputation change.
    pub reputation: i64,
    /// Items added to inventory.
    pub items: Vec<ItemGrant>,
    /// Title unlocked, if any.
    pub title: Option<String>,
}

impl RewardGrant {
    /// Whether the grant carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.currency.is_zero()
            && self.experience == 0
            && self.reputation == 0
            && self.items.is_empty()
            && self.title.is_none()
    }
}

/// The simulated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerProfile {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name used in notification templates.
    pub name: String,
    /// Current level, derived from experience.
    pub level: u32,
    /// Resource balances.
    pub resources: Resources,
    /// Item inventory keyed by item key.
    pub inventory: BTreeMap<String, u32>,
    /// Titles unlocked by achievements.
    pub titles: Vec<String>,
}

impl PlayerProfile {
    /// Create a level-1 player with default resources.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            level: 1,
            resources: Resources::default(),
            inventory: BTreeMap::new(),
            titles: Vec::new(),
        }
    }

    /// Number of `item_key` items held.
    pub fn item_count(&self, item_key: &str) -> u32 {
        self.inventory.get(item_key).copied().unwrap_or(0)
    }

    /// Add items to the inventory (saturating).
    pub fn add_item(&mut self, item_key: &str, quantity: u32) {
        let entry = self.inventory.entry(item_key.to_owned()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Apply a signed resource change.
    ///
    /// Refused without any mutation if it would leave currency or energy
    /// negative. Energy gains are capped at `max_energy`; negative
    /// experience is ignored since experience never decreases.
    pub fn apply_delta(&mut self, delta: &ResourceDelta) -> Result<(), Rejection> {
        let currency = self
            .resources
            .currency
            .checked_add(delta.currency)
            .ok_or_else(|| Rejection::new(RejectionReason::InvalidInput, "currency overflow"))?;
        if currency.is_sign_negative() && !currency.is_zero() {
            return Err(Rejection::new(
                RejectionReason::InsufficientFunds,
                format!(
                    "need {} but only {} available",
                    -delta.currency, self.resources.currency
                ),
            ));
        }
        let energy = i64::from(self.resources.energy).saturating_add(delta.energy);
        if energy < 0 {
            return Err(Rejection::new(
                RejectionReason::InsufficientEnergy,
                format!(
                    "need {} energy but only {} available",
                    delta.energy.saturating_neg(),
                    self.resources.energy
                ),
            ));
        }

        self.resources.currency = currency;
        self.resources.energy = u32::try_from(energy)
            .unwrap_or(u32::MAX)
            .min(self.resources.max_energy);
        self.resources.reputation = self.resources.reputation.saturating_add(delta.reputation);
        if let Ok(gain) = u64::try_from(delta.experience) {
            self.resources.experience = self.resources.experience.saturating_add(gain);
        }
        Ok(())
    }

    /// Credit a reward grant. Titles already held are not duplicated.
    pub fn apply_grant(&mut self, grant: &RewardGrant) {
        self.resources.currency = self.resources.currency.saturating_add(grant.currency);
        self.resources.experience = self.resources.experience.saturating_add(grant.experience);
        self.resources.reputation = self.resources.reputation.saturating_add(grant.reputation);
        for item in &grant.items {
            self.add_item(&item.item_key, item.quantity);
        }
        if let Some(title) = &grant.title {
            if !self.titles.contains(title) {
                self.titles.push(title.clone());
            }
        }
    }
}

/// Cumulative experience required to reach `level`.
///
/// Level 1 needs nothing; each further level follows `100 * (level - 1)^2`.
pub fn experience_for_level(level: u32) -> u64 {
    let steps = u64::from(level.saturating_sub(1));
    XP_CURVE_BASE.saturating_mul(steps.saturating_mul(steps))
}

/// The level a player with `experience` total experience has reached.
pub fn level_for_experience(experience: u64) -> u32 {
    let mut level = 1;
    while level < MAX_LEVEL && experience >= experience_for_level(level.saturating_add(1)) {
        level = level.saturating_add(1);
    }
    level
}
