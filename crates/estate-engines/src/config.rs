//! Tuning parameters for the domain engines.
//!
//! Each struct is a section of `estate-config.yaml` (`tenants`, `market`,
//! `exploration`). Every field has a serde default so a partial section, or
//! none at all, yields the stock tuning.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Tenants
// ---------------------------------------------------------------------------

/// Weights of the satisfaction factors, in points per day at full strength.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SatisfactionWeights {
    /// Property condition factor.
    #[serde(default = "default_condition_weight")]
    pub condition: f64,
    /// Rent-to-income factor.
    #[serde(default = "default_affordability_weight")]
    pub affordability: f64,
    /// Unresolved complaints factor.
    #[serde(default = "default_complaint_weight")]
    pub complaints: f64,
    /// Average relationship factor.
    #[serde(default = "default_relationship_weight")]
    pub relationships: f64,
}

impl Default for SatisfactionWeights {
    fn default() -> Self {
        Self {
            condition: default_condition_weight(),
            affordability: default_affordability_weight(),
            complaints: default_complaint_weight(),
            relationships: default_relationship_weight(),
        }
    }
}

/// Tenant engine tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TenantConfig {
    /// Satisfaction factor weights.
    #[serde(default)]
    pub weights: SatisfactionWeights,
    /// Rent share / income ratio at which affordability is neutral.
    #[serde(default = "default_affordable_ratio")]
    pub affordable_ratio: f64,
    /// Complaints beyond this count add no further penalty.
    #[serde(default = "default_max_complaint_penalty")]
    pub max_complaint_penalty: u32,
    /// Below this satisfaction a tenant may default on rent.
    #[serde(default = "default_rent_default_threshold")]
    pub rent_default_threshold: f64,
    /// Consecutive missed payments that trigger eviction.
    #[serde(default = "default_eviction_misses")]
    pub eviction_misses: u32,
    /// Days between pairwise interactions.
    #[serde(default = "default_interaction_interval_days")]
    pub interaction_interval_days: u64,
    /// Condition under which `property:needs_maintenance` fires.
    #[serde(default = "default_maintenance_threshold")]
    pub maintenance_threshold: f64,
    /// Condition lost per day regardless of tenants.
    #[serde(default = "default_base_decay_per_day")]
    pub base_decay_per_day: f64,
    /// Extra condition lost per day per point of tenant messiness (10 - cleanliness).
    #[serde(default = "default_wear_per_messiness")]
    pub wear_per_messiness: f64,
    /// Condition under which tenants may file maintenance complaints.
    #[serde(default = "default_complaint_condition_threshold")]
    pub complaint_condition_threshold: f64,
    /// Daily chance of a maintenance complaint in a run-down property.
    #[serde(default = "default_maintenance_complaint_chance")]
    pub maintenance_complaint_chance: f64,
    /// Daily chance per point of excess noise of a noise complaint.
    #[serde(default = "default_noise_complaint_chance")]
    pub noise_complaint_chance: f64,
    /// Chance that a negative interaction produces a neighbor complaint.
    #[serde(default = "default_conflict_complaint_chance")]
    pub conflict_complaint_chance: f64,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            weights: SatisfactionWeights::default(),
            affordable_ratio: default_affordable_ratio(),
            max_complaint_penalty: default_max_complaint_penalty(),
            rent_default_threshold: default_rent_default_threshold(),
            eviction_misses: default_eviction_misses(),
            interaction_interval_days: default_interaction_interval_days(),
            maintenance_threshold: default_maintenance_threshold(),
            base_decay_per_day: default_base_decay_per_day(),
            wear_per_messiness: default_wear_per_messiness(),
            complaint_condition_threshold: default_complaint_condition_threshold(),
            maintenance_complaint_chance: default_maintenance_complaint_chance(),
            noise_complaint_chance: default_noise_complaint_chance(),
            conflict_complaint_chance: default_conflict_complaint_chance(),
        }
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

/// Market engine tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarketConfig {
    /// Maximum random price move per tick, as a fraction.
    #[serde(default = "default_price_fluctuation")]
    pub price_fluctuation: f64,
    /// Fraction of the gap to the target price closed per day.
    #[serde(default = "default_price_reversion_per_day")]
    pub price_reversion_per_day: f64,
    /// Fraction of the gap to 1.0 that demand/supply indices close per day.
    #[serde(default = "default_index_reversion_per_day")]
    pub index_reversion_per_day: f64,
    /// Maximum random index move per day.
    #[serde(default = "default_index_noise_per_day")]
    pub index_noise_per_day: f64,
    /// Chance per simulated day of a new market event.
    #[serde(default = "default_event_chance_per_day")]
    pub event_chance_per_day: f64,
    /// Shortest event duration.
    #[serde(default = "default_min_event_days")]
    pub min_event_days: u64,
    /// Longest event duration.
    #[serde(default = "default_max_event_days")]
    pub max_event_days: u64,
    /// Fraction of trend strength lost per day.
    #[serde(default = "default_trend_decay_per_day")]
    pub trend_decay_per_day: f64,
    /// Trends weaker than this are dropped.
    #[serde(default = "default_trend_floor")]
    pub trend_floor: f64,
    /// Daily price samples kept per product.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Demand index increase per unit purchased.
    #[serde(default = "default_purchase_demand_bump")]
    pub purchase_demand_bump: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_fluctuation: default_price_fluctuation(),
            price_reversion_per_day: default_price_reversion_per_day(),
            index_reversion_per_day: default_index_reversion_per_day(),
            index_noise_per_day: default_index_noise_per_day(),
            event_chance_per_day: default_event_chance_per_day(),
            min_event_days: default_min_event_days(),
            max_event_days: default_max_event_days(),
            trend_decay_per_day: default_trend_decay_per_day(),
            trend_floor: default_trend_floor(),
            history_len: default_history_len(),
            purchase_demand_bump: default_purchase_demand_bump(),
        }
    }
}

// ---------------------------------------------------------------------------
// Exploration
// ---------------------------------------------------------------------------

/// Exploration engine tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExplorationConfig {
    /// Missions kept available at all times.
    #[serde(default = "default_target_available")]
    pub target_available: usize,
    /// Days an unstarted mission stays available.
    #[serde(default = "default_mission_lifetime_days")]
    pub mission_lifetime_days: u64,
    /// Success-rate bonus per level above the mission minimum.
    #[serde(default = "default_level_bonus_per_level")]
    pub level_bonus_per_level: f64,
    /// Cap on the level bonus.
    #[serde(default = "default_level_bonus_cap")]
    pub level_bonus_cap: f64,
    /// Experience divided by this is the experience bonus.
    #[serde(default = "default_experience_divisor")]
    pub experience_divisor: f64,
    /// Cap on the experience bonus.
    #[serde(default = "default_experience_bonus_cap")]
    pub experience_bonus_cap: f64,
    /// Multiplier on each risk probability subtracted from the success rate.
    #[serde(default = "default_risk_weight")]
    pub risk_weight: f64,
    /// Lowest adjusted success rate.
    #[serde(default = "default_min_success_rate")]
    pub min_success_rate: f64,
    /// Highest adjusted success rate.
    #[serde(default = "default_max_success_rate")]
    pub max_success_rate: f64,
    /// Lower bound of the reward multiplier on success.
    #[serde(default = "default_reward_variance_low")]
    pub reward_variance_low: f64,
    /// Upper bound of the reward multiplier on success.
    #[serde(default = "default_reward_variance_high")]
    pub reward_variance_high: f64,
    /// Chance of bonus loot on success.
    #[serde(default = "default_bonus_loot_chance")]
    pub bonus_loot_chance: f64,
    /// Fraction of currency and experience granted on failure.
    #[serde(default = "default_consolation_fraction")]
    pub consolation_fraction: f64,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            target_available: default_target_available(),
            mission_lifetime_days: default_mission_lifetime_days(),
            level_bonus_per_level: default_level_bonus_per_level(),
            level_bonus_cap: default_level_bonus_cap(),
            experience_divisor: default_experience_divisor(),
            experience_bonus_cap: default_experience_bonus_cap(),
            risk_weight: default_risk_weight(),
            min_success_rate: default_min_success_rate(),
            max_success_rate: default_max_success_rate(),
            reward_variance_low: default_reward_variance_low(),
            reward_variance_high: default_reward_variance_high(),
            bonus_loot_chance: default_bonus_loot_chance(),
            consolation_fraction: default_consolation_fraction(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (required by serde)
// ---------------------------------------------------------------------------

const fn default_condition_weight() -> f64 {
    2.0
}
const fn default_affordability_weight() -> f64 {
    3.0
}
const fn default_complaint_weight() -> f64 {
    1.0
}
const fn default_relationship_weight() -> f64 {
    1.0
}
const fn default_affordable_ratio() -> f64 {
    0.30
}
const fn default_max_complaint_penalty() -> u32 {
    5
}
const fn default_rent_default_threshold() -> f64 {
    30.0
}
const fn default_eviction_misses() -> u32 {
    3
}
const fn default_interaction_interval_days() -> u64 {
    3
}
const fn default_maintenance_threshold() -> f64 {
    40.0
}
const fn default_base_decay_per_day() -> f64 {
    0.2
}
const fn default_wear_per_messiness() -> f64 {
    0.05
}
const fn default_complaint_condition_threshold() -> f64 {
    35.0
}
const fn default_maintenance_complaint_chance() -> f64 {
    0.1
}
const fn default_noise_complaint_chance() -> f64 {
    0.02
}
const fn default_conflict_complaint_chance() -> f64 {
    0.3
}
const fn default_price_fluctuation() -> f64 {
    0.02
}
const fn default_price_reversion_per_day() -> f64 {
    0.1
}
const fn default_index_reversion_per_day() -> f64 {
    0.1
}
const fn default_index_noise_per_day() -> f64 {
    0.02
}
const fn default_event_chance_per_day() -> f64 {
    0.05
}
const fn default_min_event_days() -> u64 {
    3
}
const fn default_max_event_days() -> u64 {
    10
}
const fn default_trend_decay_per_day() -> f64 {
    0.1
}
const fn default_trend_floor() -> f64 {
    0.005
}
const fn default_history_len() -> usize {
    30
}
const fn default_purchase_demand_bump() -> f64 {
    0.01
}
const fn default_target_available() -> usize {
    4
}
const fn default_mission_lifetime_days() -> u64 {
    5
}
const fn default_level_bonus_per_level() -> f64 {
    0.02
}
const fn default_level_bonus_cap() -> f64 {
    0.2
}
const fn default_experience_divisor() -> f64 {
    10_000.0
}
const fn default_experience_bonus_cap() -> f64 {
    0.05
}
const fn default_risk_weight() -> f64 {
    0.5
}
const fn default_min_success_rate() -> f64 {
    0.05
}
const fn default_max_success_rate() -> f64 {
    0.95
}
const fn default_reward_variance_low() -> f64 {
    0.8
}
const fn default_reward_variance_high() -> f64 {
    1.2
}
const fn default_bonus_loot_chance() -> f64 {
    0.1
}
const fn default_consolation_fraction() -> f64 {
    0.15
}
