//! Progress tracking, completion, and reward claims.
//!
//! [`AchievementEngine`] is a short-lived handle over the persisted
//! [`AchievementBook`]: the orchestrator builds one around the book, the
//! event bus, and the current simulated instant whenever achievements need
//! to react to something, then drops it.
//!
//! # Invariants
//!
//! - A condition's `current` never decreases.
//! - Aggregate progress is the mean of the per-condition ratios, in `[0, 1]`.
//! - Status only moves forward: `locked -> in_progress -> completed -> claimed`.
//! - `achievement:completed` is emitted exactly once per player and achievement.

use chrono::{DateTime, Utc};
use estate_events::EventBus;
use estate_types::events::{AchievementClaimedDetails, AchievementCompletedDetails};
use estate_types::{
    AchievementBook, AchievementDefinition, AchievementId, AchievementProgress, AchievementStatus,
    ConditionKind, GameEvent, GameState, PlayerId, RewardGrant,
};
use rust_decimal::prelude::ToPrimitive;
use tracing::{debug, info};

use crate::error::AchievementError;

/// Result of a reward claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The reward was claimed; the grant still has to be credited.
    Claimed(RewardGrant),
    /// Not every condition is met yet.
    NotCompleted,
    /// The reward was claimed before.
    AlreadyClaimed,
}

/// The parts of the world absolute conditions are measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSnapshot {
    /// The player whose progress is tracked.
    pub player_id: PlayerId,
    /// Player level.
    pub level: u32,
    /// Currency held.
    pub currency: f64,
    /// Properties owned.
    pub properties: usize,
    /// Tenants housed.
    pub tenants: usize,
    /// Current simulated day.
    pub day: u64,
}

impl WorldSnapshot {
    /// Measure `state`.
    pub fn of(state: &GameState) -> Self {
        Self {
            player_id: state.player.id,
            level: state.player.level,
            currency: state.player.resources.currency.to_f64().unwrap_or(0.0),
            properties: state.properties.len(),
            tenants: state.tenants.len(),
            day: state.time.day(),
        }
    }
}

/// Mutating view over the achievement book.
#[derive(Debug)]
pub struct AchievementEngine<'a> {
    book: &'a mut AchievementBook,
    bus: &'a mut EventBus,
    now: DateTime<Utc>,
}

impl<'a> AchievementEngine<'a> {
    /// Wrap `book`, stamping changes with `now`.
    pub fn new(book: &'a mut AchievementBook, bus: &'a mut EventBus, now: DateTime<Utc>) -> Self {
        Self { book, bus, now }
    }

    /// Add a definition to the catalog.
    pub fn register(&mut self, definition: AchievementDefinition) -> Result<(), AchievementError> {
        if self.book.definitions.contains_key(&definition.id) {
            return Err(AchievementError::DuplicateAchievement(definition.id));
        }
        if definition.conditions.is_empty() {
            return Err(AchievementError::InvalidDefinition {
                id: definition.id,
                reason: String::from("no conditions"),
            });
        }
        debug!(id = %definition.id, "achievement registered");
        self.book
            .definitions
            .insert(definition.id.clone(), definition);
        Ok(())
    }

    /// Register every definition in `catalog`, skipping ids already present.
    ///
    /// Returns how many were added.
    pub fn register_missing(&mut self, catalog: Vec<AchievementDefinition>) -> usize {
        let mut added = 0_usize;
        for definition in catalog {
            if !self.book.definitions.contains_key(&definition.id) && self.register(definition).is_ok() {
                added = added.saturating_add(1);
            }
        }
        added
    }

    /// Record an observed `value` for `kind`.
    ///
    /// Each matching condition keeps the highest value seen. Returns the
    /// achievements this call completed.
    pub fn update_progress(&mut self, player: PlayerId, kind: ConditionKind, value: f64) -> Vec<AchievementId> {
        let now = self.now;
        let definitions = &self.book.definitions;
        let records = self.book.progress.entry(player).or_default();
        let mut completed = Vec::new();

        for definition in definitions.values() {
            if !definition.conditions.iter().any(|c| c.kind == kind) {
                continue;
            }
            let record = records
                .entry(definition.id.clone())
                .or_insert_with(|| AchievementProgress::for_definition(definition));
            if matches!(
                record.status,
                AchievementStatus::Completed | AchievementStatus::Claimed
            ) {
                continue;
            }

            for condition in record.conditions.iter_mut().filter(|c| c.kind == kind) {
                if value > condition.current {
                    condition.current = value;
                }
            }
            let count = record.conditions.len().max(1) as f64;
            record.progress = record.conditions.iter().map(|c| c.ratio()).sum::<f64>() / count;

            if record.status == AchievementStatus::Locked && record.progress > 0.0 {
                record.status = AchievementStatus::InProgress;
                record.started_at = Some(now);
            }
            if record.conditions.iter().all(|c| c.is_met()) {
                record.status = AchievementStatus::Completed;
                record.progress = 1.0;
                record.completed_at = Some(now);
                if record.started_at.is_none() {
                    record.started_at = Some(now);
                }
                completed.push(definition.id.clone());
            }
        }

        for id in &completed {
            if let Some(definition) = self.book.definitions.get(id) {
                info!(%player, achievement = %id, "achievement completed");
                self.bus
                    .emit(GameEvent::AchievementCompleted(AchievementCompletedDetails {
                        player_id: player,
                        achievement_id: id.clone(),
                        name: definition.name.clone(),
                        tier: definition.tier,
                    }));
            }
        }
        completed
    }

    /// Add `delta` to the player's running counter for `kind`, then record
    /// the new total. Negative deltas are ignored.
    pub fn increment_progress(&mut self, player: PlayerId, kind: ConditionKind, delta: f64) -> Vec<AchievementId> {
        let counter = self
            .book
            .counters
            .entry(player)
            .or_default()
            .entry(kind)
            .or_insert(0.0);
        if delta > 0.0 {
            *counter += delta;
        }
        let total = *counter;
        self.update_progress(player, kind, total)
    }

    /// Claim the reward of a completed achievement.
    pub fn claim_reward(&mut self, player: PlayerId, id: &AchievementId) -> Result<ClaimOutcome, AchievementError> {
        let definition = self
            .book
            .definitions
            .get(id)
            .ok_or_else(|| AchievementError::UnknownAchievement(id.clone()))?;
        let Some(record) = self
            .book
            .progress
            .get_mut(&player)
            .and_then(|records| records.get_mut(id))
        else {
            return Ok(ClaimOutcome::NotCompleted);
        };

        match record.status {
            AchievementStatus::Claimed => Ok(ClaimOutcome::AlreadyClaimed),
            AchievementStatus::Locked | AchievementStatus::InProgress => Ok(ClaimOutcome::NotCompleted),
            AchievementStatus::Completed => {
                record.status = AchievementStatus::Claimed;
                record.claimed_at = Some(self.now);
                let rewards = definition.rewards.clone();
                info!(%player, achievement = %id, "achievement claimed");
                self.bus
                    .emit(GameEvent::AchievementClaimed(AchievementClaimedDetails {
                        player_id: player,
                        achievement_id: id.clone(),
                        rewards: rewards.clone(),
                    }));
                Ok(ClaimOutcome::Claimed(rewards))
            }
        }
    }

    /// Feed one domain event into the tracked conditions.
    ///
    /// Returns the achievements completed as a result.
    pub fn handle_event(&mut self, event: &GameEvent, world: &WorldSnapshot) -> Vec<AchievementId> {
        let player = world.player_id;
        let mut completed = Vec::new();
        match event {
            GameEvent::RentPaid(details) => {
                let amount = details.amount.to_f64().unwrap_or(0.0);
                completed.extend(self.increment_progress(player, ConditionKind::RentCollected, amount));
                completed.extend(self.increment_progress(player, ConditionKind::RentPayments, 1.0));
                completed.extend(self.update_progress(player, ConditionKind::CurrencyHeld, world.currency));
            }
            GameEvent::PositiveInteraction(_) => {
                completed.extend(self.increment_progress(player, ConditionKind::PositiveInteractions, 1.0));
            }
            GameEvent::MissionCompleted(details) => {
                completed.extend(self.increment_progress(player, ConditionKind::MissionsCompleted, 1.0));
                if details.success {
                    completed.extend(self.increment_progress(player, ConditionKind::MissionsSucceeded, 1.0));
                }
                completed.extend(self.update_progress(player, ConditionKind::CurrencyHeld, world.currency));
            }
            GameEvent::ItemPurchased(details) => {
                completed.extend(self.increment_progress(
                    player,
                    ConditionKind::ItemsPurchased,
                    f64::from(details.quantity),
                ));
            }
            GameEvent::MarketEventOccurred(_) => {
                completed.extend(self.increment_progress(player, ConditionKind::MarketEventsWitnessed, 1.0));
            }
            GameEvent::PropertyAdded(_) => {
                completed.extend(self.update_progress(player, ConditionKind::PropertiesOwned, world.properties as f64));
            }
            GameEvent::TenantAdded(_) | GameEvent::TenantRemoved(_) => {
                completed.extend(self.update_progress(player, ConditionKind::TenantsHoused, world.tenants as f64));
            }
            GameEvent::LevelUp(details) => {
                completed.extend(self.update_progress(player, ConditionKind::PlayerLevel, f64::from(details.new_level)));
            }
            GameEvent::ResourcesChanged(_) | GameEvent::AchievementClaimed(_) => {
                completed.extend(self.update_progress(player, ConditionKind::CurrencyHeld, world.currency));
            }
            GameEvent::DayPassed(details) => {
                completed.extend(self.update_progress(player, ConditionKind::DaysPlayed, details.day as f64));
                completed.extend(self.update_progress(player, ConditionKind::CurrencyHeld, world.currency));
            }
            _ => {}
        }
        completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use estate_types::events::{DayPassedDetails, MissionCompletedDetails};
    use estate_types::{
        AchievementCategory, AchievementCondition, AchievementTier, MissionId,
    };
    use rust_decimal::Decimal;

    use super::*;

    fn definition(id: &str, conditions: &[(ConditionKind, f64)]) -> AchievementDefinition {
        AchievementDefinition {
            id: AchievementId::new(id),
            name: id.to_owned(),
            description: String::new(),
            category: AchievementCategory::Financial,
            tier: AchievementTier::Bronze,
            conditions: conditions
                .iter()
                .map(|(kind, target)| AchievementCondition {
                    kind: *kind,
                    target: *target,
                })
                .collect(),
            rewards: RewardGrant {
                currency: Decimal::new(500, 0),
                ..RewardGrant::default()
            },
            hidden: false,
        }
    }

    fn snapshot(player_id: PlayerId) -> WorldSnapshot {
        WorldSnapshot {
            player_id,
            level: 1,
            currency: 10_000.0,
            properties: 0,
            tenants: 0,
            day: 0,
        }
    }

    fn progress<'b>(book: &'b AchievementBook, player: PlayerId, id: &str) -> &'b AchievementProgress {
        book.progress
            .get(&player)
            .unwrap()
            .get(&AchievementId::new(id))
            .unwrap()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition("first", &[(ConditionKind::RentPayments, 1.0)]))
            .unwrap();
        let err = engine
            .register(definition("first", &[(ConditionKind::RentPayments, 2.0)]))
            .unwrap_err();
        assert!(matches!(err, AchievementError::DuplicateAchievement(_)));
        let empty = engine.register(definition("empty", &[])).unwrap_err();
        assert!(matches!(empty, AchievementError::InvalidDefinition { .. }));
    }

    #[test]
    fn half_met_second_condition_gives_three_quarters() {
        let player = PlayerId::new();
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition(
                "landlord",
                &[(ConditionKind::PropertiesOwned, 2.0), (ConditionKind::TenantsHoused, 4.0)],
            ))
            .unwrap();
        engine.update_progress(player, ConditionKind::PropertiesOwned, 2.0);
        let done = engine.update_progress(player, ConditionKind::TenantsHoused, 2.0);
        assert!(done.is_empty());

        let record = progress(&book, player, "landlord");
        assert!((record.progress - 0.75).abs() < 1e-9);
        assert_eq!(record.status, AchievementStatus::InProgress);
        assert!((record.percent() - 75.0).abs() < 1e-9);
        assert_eq!(bus.emitted_count(), 0);
    }

    #[test]
    fn lower_values_never_reduce_progress() {
        let player = PlayerId::new();
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition("level", &[(ConditionKind::PlayerLevel, 10.0)]))
            .unwrap();
        engine.update_progress(player, ConditionKind::PlayerLevel, 6.0);
        engine.update_progress(player, ConditionKind::PlayerLevel, 3.0);
        let record = progress(&book, player, "level");
        let current = record.conditions.first().unwrap().current;
        assert!((current - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn completion_emits_once() {
        let player = PlayerId::new();
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition("rent", &[(ConditionKind::RentPayments, 2.0)]))
            .unwrap();
        assert!(engine.increment_progress(player, ConditionKind::RentPayments, 1.0).is_empty());
        let done = engine.increment_progress(player, ConditionKind::RentPayments, 1.0);
        assert_eq!(done, vec![AchievementId::new("rent")]);
        assert!(engine.increment_progress(player, ConditionKind::RentPayments, 1.0).is_empty());

        let completions = bus
            .journal()
            .iter()
            .filter(|e| matches!(e, GameEvent::AchievementCompleted(_)))
            .count();
        assert_eq!(completions, 1);
        assert_eq!(
            progress(&book, player, "rent").status,
            AchievementStatus::Completed
        );
    }

    #[test]
    fn claim_is_idempotent() {
        let player = PlayerId::new();
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition("rent", &[(ConditionKind::RentPayments, 1.0)]))
            .unwrap();
        let id = AchievementId::new("rent");

        assert_eq!(engine.claim_reward(player, &id).unwrap(), ClaimOutcome::NotCompleted);
        engine.increment_progress(player, ConditionKind::RentPayments, 1.0);
        let first = engine.claim_reward(player, &id).unwrap();
        assert!(matches!(first, ClaimOutcome::Claimed(ref grant) if grant.currency == Decimal::new(500, 0)));
        assert_eq!(engine.claim_reward(player, &id).unwrap(), ClaimOutcome::AlreadyClaimed);

        let unknown = engine.claim_reward(player, &AchievementId::new("nope"));
        assert!(matches!(unknown, Err(AchievementError::UnknownAchievement(_))));

        let claims = bus
            .journal()
            .iter()
            .filter(|e| matches!(e, GameEvent::AchievementClaimed(_)))
            .count();
        assert_eq!(claims, 1);
        assert_eq!(progress(&book, player, "rent").status, AchievementStatus::Claimed);
    }

    #[test]
    fn events_map_to_conditions() {
        let player = PlayerId::new();
        let world = snapshot(player);
        let mut book = AchievementBook::default();
        let mut bus = EventBus::new();
        let mut engine = AchievementEngine::new(&mut book, &mut bus, DateTime::<Utc>::default());
        engine
            .register(definition("explorer", &[(ConditionKind::MissionsSucceeded, 1.0)]))
            .unwrap();
        engine
            .register(definition("week", &[(ConditionKind::DaysPlayed, 7.0)]))
            .unwrap();

        let failed = GameEvent::MissionCompleted(MissionCompletedDetails {
            mission_id: MissionId::new(),
            name: String::from("Ridge Caves"),
            success: false,
            bonus_loot: false,
            grant: RewardGrant::default(),
        });
        assert!(engine.handle_event(&failed, &world).is_empty());
        let succeeded = GameEvent::MissionCompleted(MissionCompletedDetails {
            mission_id: MissionId::new(),
            name: String::from("Ridge Caves"),
            success: true,
            bonus_loot: false,
            grant: RewardGrant::default(),
        });
        assert_eq!(
            engine.handle_event(&succeeded, &world),
            vec![AchievementId::new("explorer")]
        );
        assert_eq!(
            engine.handle_event(&GameEvent::DayPassed(DayPassedDetails { day: 7 }), &world),
            vec![AchievementId::new("week")]
        );

        let counters = book.counters.get(&player).unwrap();
        let missions = counters.get(&ConditionKind::MissionsCompleted).copied().unwrap();
        assert!((missions - 2.0).abs() < f64::EPSILON);
    }
}
