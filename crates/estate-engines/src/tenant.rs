//! Tenant simulation: satisfaction, rent, wear, complaints, and interactions.
//!
//! Satisfaction drifts every tick toward what the tenant's situation
//! warrants. Everything else happens once per simulated day: rent on the
//! tenant's billing day, property wear, complaints, move-outs, and (every
//! few days) a random pairwise interaction between co-tenants.

use estate_events::EventBus;
use estate_types::events::{
    ComplaintDetails, InteractionDetails, MaintenanceNeededDetails, RentDetails,
    SatisfactionChangedDetails, TenantRemovedDetails,
};
use estate_types::tenant::RENT_CYCLE_DAYS;
use estate_types::{
    Complaint, ComplaintId, ComplaintKind, GameEvent, GameState, PaymentStatus, Property,
    PropertyId, RemovalReason, Tenant, TenantId,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info, warn};

use crate::config::TenantConfig;
use crate::engine::{Inbox, SubEngine, TickContext};
use crate::error::EngineError;
use crate::rng::SimRng;

/// Engine name used in logs and tick summaries.
pub const TENANT_ENGINE: &str = "tenants";

/// Compatibility above which an interaction is positive.
pub const POSITIVE_INTERACTION_SCORE: f64 = 70.0;

/// Compatibility below which an interaction is negative.
pub const NEGATIVE_INTERACTION_SCORE: f64 = 30.0;

const NEUTRAL_COMPATIBILITY: f64 = 50.0;
const SHARED_TRAIT_BONUS: f64 = 10.0;
const PREFERRED_TRAIT_BONUS: f64 = 8.0;
const DISLIKED_TRAIT_PENALTY: f64 = 12.0;
const NOISE_PENALTY_PER_POINT: f64 = 3.0;
const SOCIAL_PENALTY_PER_POINT: f64 = 2.0;
const SCHEDULE_MATCH_BONUS: f64 = 10.0;

const POSITIVE_SATISFACTION_BOOST: f64 = 2.0;
const NEGATIVE_SATISFACTION_HIT: f64 = 3.0;
const RELATIONSHIP_SWING_MIN: i32 = 5;
const RELATIONSHIP_SWING_SPREAD: usize = 6;
const NEUTRAL_RELATIONSHIP_GAIN: i32 = 1;

// ---------------------------------------------------------------------------
// Pure helpers
// ---------------------------------------------------------------------------

/// Affordability factor in `[-1, 1]`.
///
/// Neutral when the tenant's rent share is exactly `affordable_ratio` of
/// their income, positive when cheaper, negative when dearer. A tenant
/// without income gets the worst score.
pub fn affordability_factor(affordable_ratio: f64, rent_share: Decimal, income: Decimal) -> f64 {
    if income <= Decimal::ZERO || affordable_ratio <= 0.0 {
        return -1.0;
    }
    let ratio = rent_share
        .checked_div(income)
        .and_then(|r| r.to_f64())
        .unwrap_or(f64::MAX);
    ((affordable_ratio - ratio) / affordable_ratio).clamp(-1.0, 1.0)
}

/// Satisfaction change per simulated day for `tenant` living in `property`.
pub fn satisfaction_delta(config: &TenantConfig, tenant: &Tenant, property: &Property) -> f64 {
    let weights = &config.weights;
    let condition = (property.condition - 50.0) / 50.0;
    let affordability = affordability_factor(
        config.affordable_ratio,
        property.rent_share(),
        tenant.financials.monthly_income,
    );
    let capped_complaints = tenant
        .unresolved_complaints()
        .min(usize::try_from(config.max_complaint_penalty).unwrap_or(usize::MAX));
    let complaints = -(capped_complaints as f64);
    let relationships = tenant.average_relationship() / 100.0;

    weights.condition * condition
        + weights.affordability * affordability
        + weights.complaints * complaints
        + weights.relationships * relationships
}

/// Whether rent is due on `day` for a tenant billed on `rent_day`.
///
/// Billing months are a flat 30 days.
pub const fn is_rent_day(day: u64, rent_day: u64) -> bool {
    day % RENT_CYCLE_DAYS == rent_day % RENT_CYCLE_DAYS
}

/// Decide whether a rent payment of `amount` is made.
///
/// Rent above income is always missed. Below the default threshold a
/// tenant misses with probability `(threshold - satisfaction) / threshold`.
pub fn decide_payment(
    config: &TenantConfig,
    satisfaction: f64,
    amount: Decimal,
    income: Decimal,
    rng: &mut dyn SimRng,
) -> PaymentStatus {
    if amount > income {
        return PaymentStatus::Missed;
    }
    let threshold = config.rent_default_threshold;
    if threshold > 0.0 && satisfaction < threshold {
        let default_chance = (threshold - satisfaction) / threshold;
        if rng.chance(default_chance) {
            return PaymentStatus::Missed;
        }
    }
    PaymentStatus::Paid
}

/// How well `a` gets on with `b`, from `a`'s point of view, in `[0, 100]`.
pub fn compatibility_score(a: &Tenant, b: &Tenant) -> f64 {
    let mut score = NEUTRAL_COMPATIBILITY;

    let shared = a.traits.iter().filter(|t| b.has_trait(**t)).count();
    score += SHARED_TRAIT_BONUS * shared as f64;

    for trait_ in &b.traits {
        if a.preferences.preferred_traits.contains(trait_) {
            score += PREFERRED_TRAIT_BONUS;
        }
        if a.preferences.disliked_traits.contains(trait_) {
            score -= DISLIKED_TRAIT_PENALTY;
        }
    }

    let excess_noise = b
        .lifestyle
        .noise_level
        .saturating_sub(a.preferences.noise_tolerance);
    score -= NOISE_PENALTY_PER_POINT * f64::from(excess_noise);

    let social_gap = a.lifestyle.social_activity.abs_diff(b.lifestyle.social_activity);
    score -= SOCIAL_PENALTY_PER_POINT * f64::from(social_gap);

    if a.lifestyle.schedule == b.lifestyle.schedule {
        score += SCHEDULE_MATCH_BONUS;
    }

    score.clamp(0.0, 100.0)
}

/// Symmetric compatibility: the mean of both points of view.
pub fn pair_compatibility(a: &Tenant, b: &Tenant) -> f64 {
    (compatibility_score(a, b) + compatibility_score(b, a)) / 2.0
}

/// Shift a tenant's satisfaction, returning the change event if the value moved.
fn adjust_satisfaction(tenant: &mut Tenant, change: f64) -> Option<SatisfactionChangedDetails> {
    let previous = tenant.satisfaction;
    tenant.set_satisfaction(previous + change);
    ((tenant.satisfaction - previous).abs() > f64::EPSILON).then(|| SatisfactionChangedDetails {
        tenant_id: tenant.id,
        name: tenant.name.clone(),
        previous,
        current: tenant.satisfaction,
    })
}

fn file_complaint(
    tenant: &mut Tenant,
    kind: ComplaintKind,
    against: Option<TenantId>,
    day: u64,
) -> ComplaintDetails {
    let complaint = Complaint {
        id: ComplaintId::new(),
        kind,
        against,
        filed_day: day,
        resolved: false,
    };
    let details = ComplaintDetails {
        tenant_id: tenant.id,
        property_id: tenant.property_id,
        complaint_id: complaint.id,
        kind,
    };
    tenant.complaints.push(complaint);
    details
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Simulates every tenant in the game.
#[derive(Debug)]
pub struct TenantEngine {
    config: TenantConfig,
    maintained: Inbox<PropertyId>,
}

impl TenantEngine {
    /// Create the engine with the given tuning.
    pub fn new(config: TenantConfig) -> Self {
        Self {
            config,
            maintained: Inbox::new(),
        }
    }

    /// Tuning in use.
    pub const fn config(&self) -> &TenantConfig {
        &self.config
    }

    fn resolve_maintenance(state: &mut GameState, property_id: PropertyId) {
        let mut resolved = 0_usize;
        for tenant in state
            .tenants
            .values_mut()
            .filter(|t| t.property_id == property_id)
        {
            resolved = resolved.saturating_add(tenant.resolve_complaints(ComplaintKind::Maintenance));
        }
        if resolved > 0 {
            debug!(%property_id, resolved, "maintenance complaints resolved");
        }
    }

    fn update_satisfaction(&self, state: &mut GameState, bus: &mut EventBus, elapsed_days: f64) {
        let mut changes = Vec::new();
        for tenant in state.tenants.values_mut() {
            let Some(property) = state.properties.get(&tenant.property_id) else {
                warn!(tenant_id = %tenant.id, property_id = %tenant.property_id, "tenant lives in unknown property");
                continue;
            };
            let delta = satisfaction_delta(&self.config, tenant, property) * elapsed_days;
            if let Some(change) = adjust_satisfaction(tenant, delta) {
                changes.push(change);
            }
        }
        for change in changes {
            bus.emit(GameEvent::SatisfactionChanged(change));
        }
    }

    fn decay_properties(&self, state: &mut GameState, bus: &mut EventBus) {
        let property_ids: Vec<PropertyId> = state.properties.keys().copied().collect();
        for property_id in property_ids {
            let messiness: f64 = state
                .tenants_in(property_id)
                .map(|t| f64::from(10_u8.saturating_sub(t.lifestyle.cleanliness)))
                .sum();
            let decay = self.config.base_decay_per_day + messiness * self.config.wear_per_messiness;
            let Some(property) = state.properties.get_mut(&property_id) else {
                continue;
            };
            let before = property.condition;
            property.set_condition(before - decay);
            let threshold = self.config.maintenance_threshold;
            if before >= threshold && property.condition < threshold {
                bus.emit(GameEvent::MaintenanceNeeded(MaintenanceNeededDetails {
                    property_id,
                    name: property.name.clone(),
                    condition: property.condition,
                }));
            }
        }
    }

    fn collect_rent(&self, state: &mut GameState, bus: &mut EventBus, rng: &mut dyn SimRng, day: u64) {
        let due: Vec<TenantId> = state
            .tenants
            .values()
            .filter(|t| t.move_in_day != day && is_rent_day(day, t.rent_day))
            .map(|t| t.id)
            .collect();

        for tenant_id in due {
            let Some(tenant) = state.tenants.get_mut(&tenant_id) else {
                continue;
            };
            let Some(property) = state.properties.get(&tenant.property_id) else {
                continue;
            };
            let amount = property.rent_share();
            let status = decide_payment(
                &self.config,
                tenant.satisfaction,
                amount,
                tenant.financials.monthly_income,
                rng,
            );
            tenant.financials.record(day, amount, status);
            let details = RentDetails {
                tenant_id,
                name: tenant.name.clone(),
                property_id: tenant.property_id,
                amount,
                day,
                consecutive_misses: tenant.financials.consecutive_misses,
            };
            let evict = tenant.financials.consecutive_misses >= self.config.eviction_misses;

            match status {
                PaymentStatus::Paid => {
                    bus.emit(GameEvent::RentPaid(details));
                }
                PaymentStatus::Missed => {
                    info!(%tenant_id, day, misses = details.consecutive_misses, "rent missed");
                    bus.emit(GameEvent::RentMissed(details));
                    if evict {
                        Self::remove(state, bus, tenant_id, RemovalReason::Eviction);
                    }
                }
            }
        }
    }

    fn file_complaints(&self, state: &mut GameState, bus: &mut EventBus, rng: &mut dyn SimRng, day: u64) {
        let tenant_ids: Vec<TenantId> = state.tenants.keys().copied().collect();
        for tenant_id in tenant_ids {
            let Some(tenant) = state.tenants.get(&tenant_id) else {
                continue;
            };
            let condition = state
                .properties
                .get(&tenant.property_id)
                .map_or(100.0, |p| p.condition);
            let has_open = |kind: ComplaintKind, against: Option<TenantId>| {
                tenant
                    .complaints
                    .iter()
                    .any(|c| !c.resolved && c.kind == kind && c.against == against)
            };

            let mut filings: Vec<(ComplaintKind, Option<TenantId>)> = Vec::new();
            if condition < self.config.complaint_condition_threshold
                && !has_open(ComplaintKind::Maintenance, None)
                && rng.chance(self.config.maintenance_complaint_chance)
            {
                filings.push((ComplaintKind::Maintenance, None));
            }
            for neighbor in state
                .tenants_in(tenant.property_id)
                .filter(|other| other.id != tenant_id)
            {
                let excess = neighbor
                    .lifestyle
                    .noise_level
                    .saturating_sub(tenant.preferences.noise_tolerance);
                if excess > 0
                    && !has_open(ComplaintKind::Noise, Some(neighbor.id))
                    && rng.chance(self.config.noise_complaint_chance * f64::from(excess))
                {
                    filings.push((ComplaintKind::Noise, Some(neighbor.id)));
                }
            }

            if filings.is_empty() {
                continue;
            }
            let Some(tenant) = state.tenants.get_mut(&tenant_id) else {
                continue;
            };
            for (kind, against) in filings {
                let details = file_complaint(tenant, kind, against, day);
                bus.emit(GameEvent::ComplaintFiled(details));
            }
        }
    }

    fn simulate_interactions(
        &self,
        state: &mut GameState,
        bus: &mut EventBus,
        rng: &mut dyn SimRng,
        day: u64,
    ) {
        let property_ids: Vec<PropertyId> = state.properties.keys().copied().collect();
        for property_id in property_ids {
            let residents: Vec<TenantId> = state.tenants_in(property_id).map(|t| t.id).collect();
            if residents.len() < 2 {
                continue;
            }
            let first_index = rng.next_index(residents.len());
            let mut second_index = rng.next_index(residents.len().saturating_sub(1));
            if second_index >= first_index {
                second_index = second_index.saturating_add(1);
            }
            let (Some(&first), Some(&second)) =
                (residents.get(first_index), residents.get(second_index))
            else {
                continue;
            };
            let (Some(a), Some(b)) = (state.tenants.get(&first), state.tenants.get(&second)) else {
                continue;
            };
            let score = pair_compatibility(a, b);
            let names = (a.name.clone(), b.name.clone());

            let swing = RELATIONSHIP_SWING_MIN
                .saturating_add(i32::try_from(rng.next_index(RELATIONSHIP_SWING_SPREAD)).unwrap_or(0));
            let (relationship_change, satisfaction_change) = if score > POSITIVE_INTERACTION_SCORE {
                (swing, POSITIVE_SATISFACTION_BOOST)
            } else if score < NEGATIVE_INTERACTION_SCORE {
                (swing.saturating_neg(), -NEGATIVE_SATISFACTION_HIT)
            } else {
                (NEUTRAL_RELATIONSHIP_GAIN, 0.0)
            };

            let mut satisfaction_events = Vec::new();
            for (me, other) in [(first, second), (second, first)] {
                if let Some(tenant) = state.tenants.get_mut(&me) {
                    tenant
                        .relationship_mut(other)
                        .record_interaction(relationship_change, day);
                    if let Some(change) = adjust_satisfaction(tenant, satisfaction_change) {
                        satisfaction_events.push(change);
                    }
                }
            }

            let details = InteractionDetails {
                property_id,
                first,
                second,
                names,
                score,
                relationship_change,
            };
            if score > POSITIVE_INTERACTION_SCORE {
                bus.emit(GameEvent::PositiveInteraction(details));
            } else if score < NEGATIVE_INTERACTION_SCORE {
                bus.emit(GameEvent::NegativeInteraction(details));
                if rng.chance(self.config.conflict_complaint_chance) {
                    if let Some(tenant) = state.tenants.get_mut(&first) {
                        let complaint =
                            file_complaint(tenant, ComplaintKind::Neighbor, Some(second), day);
                        bus.emit(GameEvent::ComplaintFiled(complaint));
                    }
                }
            }
            for change in satisfaction_events {
                bus.emit(GameEvent::SatisfactionChanged(change));
            }
        }
    }

    fn process_move_outs(state: &mut GameState, bus: &mut EventBus) {
        let leaving: Vec<TenantId> = state
            .tenants
            .values()
            .filter(|t| t.satisfaction <= 0.0)
            .map(|t| t.id)
            .collect();
        for tenant_id in leaving {
            Self::remove(state, bus, tenant_id, RemovalReason::MoveOut);
        }
    }

    fn remove(state: &mut GameState, bus: &mut EventBus, tenant_id: TenantId, reason: RemovalReason) {
        match state.remove_tenant(tenant_id) {
            Ok(tenant) => {
                info!(%tenant_id, ?reason, "tenant removed");
                bus.emit(GameEvent::TenantRemoved(TenantRemovedDetails {
                    tenant_id,
                    property_id: tenant.property_id,
                    name: tenant.name,
                    reason,
                }));
            }
            Err(rejection) => warn!(%tenant_id, %rejection, "tenant removal failed"),
        }
    }
}

impl SubEngine for TenantEngine {
    fn name(&self) -> &'static str {
        TENANT_ENGINE
    }

    fn initialize(&mut self, state: &GameState, bus: &mut EventBus) -> Result<(), EngineError> {
        if !self.maintained.is_subscribed() {
            self.maintained
                .subscribe(bus, "property:maintained", |event| match event {
                    GameEvent::PropertyMaintained(details) => Some(details.property_id),
                    _ => None,
                });
        }
        info!(tenants = state.tenants.len(), "tenant engine initialized");
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EngineError> {
        for property_id in self.maintained.drain() {
            Self::resolve_maintenance(ctx.state, property_id);
        }

        self.update_satisfaction(ctx.state, ctx.bus, ctx.delta.elapsed_days);

        let interval = self.config.interaction_interval_days.max(1);
        for day in ctx.delta.new_days() {
            self.collect_rent(ctx.state, ctx.bus, ctx.rng, day);
            self.decay_properties(ctx.state, ctx.bus);
            self.file_complaints(ctx.state, ctx.bus, ctx.rng, day);
            if day % interval == 0 {
                self.simulate_interactions(ctx.state, ctx.bus, ctx.rng, day);
            }
            Self::process_move_outs(ctx.state, ctx.bus);
        }
        Ok(())
    }

    fn cleanup(&mut self, bus: &mut EventBus) {
        self.maintained.unsubscribe_all(bus);
    }
}
