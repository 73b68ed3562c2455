//! Tenants, their personalities, relationships, and rent records.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::bounds::{clamp_percent, clamp_strength};
use crate::ids::{ComplaintId, PropertyId, TenantId};

/// Length of the approximate billing month, in simulated days.
pub const RENT_CYCLE_DAYS: u64 = 30;

/// Number of payment records kept per tenant.
pub const PAYMENT_HISTORY_LEN: usize = 24;

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// A personality trait used for compatibility scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    /// Keeps to themselves and values silence.
    Quiet,
    /// Seeks out company.
    Social,
    /// Keeps shared spaces clean.
    Tidy,
    /// Leaves shared spaces messy.
    Messy,
    /// Plays or listens to music at home.
    Musical,
    /// Spends long hours studying or working from home.
    Studious,
    /// Owns pets.
    PetLover,
    /// Warm toward neighbors.
    Friendly,
    /// Keeps interactions brief.
    Reserved,
    /// Hosts gatherings.
    PartyGoer,
}

impl PersonalityTrait {
    /// Every trait, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Quiet,
        Self::Social,
        Self::Tidy,
        Self::Messy,
        Self::Musical,
        Self::Studious,
        Self::PetLover,
        Self::Friendly,
        Self::Reserved,
        Self::PartyGoer,
    ];
}

/// When a tenant is usually awake and at home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DailySchedule {
    /// Up at dawn, asleep early.
    EarlyBird,
    /// Regular office hours.
    Standard,
    /// Active late into the night.
    NightOwl,
    /// Shift work or no fixed routine.
    Irregular,
}

/// Lifestyle scalars, each on a 1-10 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Lifestyle {
    /// How much noise the tenant produces.
    pub noise_level: u8,
    /// How clean the tenant keeps the property.
    pub cleanliness: u8,
    /// How often the tenant socializes.
    pub social_activity: u8,
    /// Daily routine.
    pub schedule: DailySchedule,
}

/// What a tenant looks for in co-tenants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Preferences {
    /// Traits the tenant enjoys in others.
    pub preferred_traits: Vec<PersonalityTrait>,
    /// Traits the tenant dislikes in others.
    pub disliked_traits: Vec<PersonalityTrait>,
    /// Highest co-tenant noise level tolerated without friction (1-10).
    pub noise_tolerance: u8,
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// A tenant's relationship with one co-tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Relationship {
    /// Signed strength in `[-100, 100]`.
    pub strength: i32,
    /// Number of interactions so far.
    pub interactions: u32,
    /// Day of the most recent interaction.
    pub last_interaction_day: Option<u64>,
}

impl Relationship {
    /// Shift the strength by `change` (clamped) and record the interaction.
    pub fn record_interaction(&mut self, change: i32, day: u64) {
        self.strength = clamp_strength(self.strength.saturating_add(change));
        self.interactions = self.interactions.saturating_add(1);
        self.last_interaction_day = Some(day);
    }
}

// ---------------------------------------------------------------------------
// Finances
// ---------------------------------------------------------------------------

/// Outcome of one rent-day decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Rent was paid in full.
    Paid,
    /// Rent was not paid.
    Missed,
}

/// One entry in a tenant's payment history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PaymentRecord {
    /// Simulated day the rent was due.
    pub day: u64,
    /// Amount that was due.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// Whether it was paid.
    pub status: PaymentStatus,
}

/// A tenant's income and payment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Financials {
    /// Monthly income.
    #[ts(as = "String")]
    pub monthly_income: Decimal,
    /// Most recent payments, oldest first.
    pub payment_history: Vec<PaymentRecord>,
    /// Missed payments since the last successful one.
    pub consecutive_misses: u32,
}

impl Financials {
    /// Create a record with no history.
    pub const fn with_income(monthly_income: Decimal) -> Self {
        Self {
            monthly_income,
            payment_history: Vec::new(),
            consecutive_misses: 0,
        }
    }

    /// Append a payment and update the miss streak.
    pub fn record(&mut self, day: u64, amount: Decimal, status: PaymentStatus) {
        match status {
            PaymentStatus::Paid => self.consecutive_misses = 0,
            PaymentStatus::Missed => {
                self.consecutive_misses = self.consecutive_misses.saturating_add(1);
            }
        }
        self.payment_history.push(PaymentRecord {
            day,
            amount,
            status,
        });
        if self.payment_history.len() > PAYMENT_HISTORY_LEN {
            let excess = self.payment_history.len().saturating_sub(PAYMENT_HISTORY_LEN);
            self.payment_history.drain(..excess);
        }
    }
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

/// What a complaint is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintKind {
    /// The property needs repairs.
    Maintenance,
    /// A co-tenant is too loud.
    Noise,
    /// A co-tenant is hard to live with.
    Neighbor,
    /// Shared spaces are dirty.
    Cleanliness,
}

/// A complaint filed by a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Complaint {
    /// Complaint identifier.
    pub id: ComplaintId,
    /// Subject of the complaint.
    pub kind: ComplaintKind,
    /// Co-tenant the complaint is about, if any.
    pub against: Option<TenantId>,
    /// Simulated day the complaint was filed.
    pub filed_day: u64,
    /// Whether the landlord has dealt with it.
    pub resolved: bool,
}

// ---------------------------------------------------------------------------
// Tenant
// ---------------------------------------------------------------------------

/// A tenant living in one of the player's properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Tenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Display name.
    pub name: String,
    /// Personality traits.
    pub traits: Vec<PersonalityTrait>,
    /// Lifestyle scalars.
    pub lifestyle: Lifestyle,
    /// Co-tenant preferences.
    pub preferences: Preferences,
    /// Satisfaction in `[0, 100]`.
    pub satisfaction: f64,
    /// Relationships keyed by co-tenant.
    pub relationships: BTreeMap<TenantId, Relationship>,
    /// Income and payment history.
    pub financials: Financials,
    /// Complaints filed, resolved or not.
    pub complaints: Vec<Complaint>,
    /// Property the tenant lives in.
    pub property_id: PropertyId,
    /// Simulated day the tenant moved in.
    pub move_in_day: u64,
    /// Day of the billing cycle on which rent is due (`move_in_day % 30`).
    pub rent_day: u64,
}

impl Tenant {
    /// Billing-cycle day for a tenant who moved in on `move_in_day`.
    pub const fn rent_day_for(move_in_day: u64) -> u64 {
        move_in_day % RENT_CYCLE_DAYS
    }

    /// Overwrite satisfaction, clamped to `[0, 100]`.
    pub fn set_satisfaction(&mut self, satisfaction: f64) {
        self.satisfaction = clamp_percent(satisfaction);
    }

    /// Whether the tenant has `trait_`.
    pub fn has_trait(&self, trait_: PersonalityTrait) -> bool {
        self.traits.contains(&trait_)
    }

    /// Number of complaints not yet resolved.
    pub fn unresolved_complaints(&self) -> usize {
        self.complaints.iter().filter(|c| !c.resolved).count()
    }

    /// Mean relationship strength, or 0 with no relationships.
    pub fn average_relationship(&self) -> f64 {
        if self.relationships.is_empty() {
            return 0.0;
        }
        let total: i64 = self
            .relationships
            .values()
            .map(|r| i64::from(r.strength))
            .sum();
        total as f64 / self.relationships.len() as f64
    }

    /// Relationship with `other`, created on first access.
    pub fn relationship_mut(&mut self, other: TenantId) -> &mut Relationship {
        self.relationships.entry(other).or_default()
    }

    /// Mark every unresolved complaint of `kind` as resolved. Returns how many changed.
    pub fn resolve_complaints(&mut self, kind: ComplaintKind) -> usize {
        let mut resolved = 0_usize;
        for complaint in self
            .complaints
            .iter_mut()
            .filter(|c| !c.resolved && c.kind == kind)
        {
            complaint.resolved = true;
            resolved = resolved.saturating_add(1);
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rent_day_wraps_billing_cycle() {
        assert_eq!(Tenant::rent_day_for(0), 0);
        assert_eq!(Tenant::rent_day_for(29), 29);
        assert_eq!(Tenant::rent_day_for(31), 1);
    }

    #[test]
    fn miss_streak_resets_on_payment() {
        let mut financials = Financials::with_income(Decimal::new(3000, 0));
        financials.record(1, Decimal::new(1000, 0), PaymentStatus::Missed);
        financials.record(31, Decimal::new(1000, 0), PaymentStatus::Missed);
        assert_eq!(financials.consecutive_misses, 2);
        financials.record(61, Decimal::new(1000, 0), PaymentStatus::Paid);
        assert_eq!(financials.consecutive_misses, 0);
        assert_eq!(financials.payment_history.len(), 3);
    }

    #[test]
    fn payment_history_is_bounded() {
        let mut financials = Financials::with_income(Decimal::new(3000, 0));
        for day in 0..40 {
            financials.record(day, Decimal::ONE, PaymentStatus::Paid);
        }
        assert_eq!(financials.payment_history.len(), PAYMENT_HISTORY_LEN);
        assert_eq!(financials.payment_history.first().map(|p| p.day), Some(16));
    }

    #[test]
    fn relationship_strength_is_clamped() {
        let mut relationship = Relationship::default();
        relationship.record_interaction(80, 1);
        relationship.record_interaction(80, 2);
        assert_eq!(relationship.strength, 100);
        assert_eq!(relationship.interactions, 2);
        assert_eq!(relationship.last_interaction_day, Some(2));
    }
}
