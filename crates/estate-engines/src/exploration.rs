//! Exploration missions: generation, start, resolution, cancellation, expiry.
//!
//! Missions move `available -> in_progress -> completed | failed | expired`
//! (or straight from `available` to `expired`) and never move backwards.
//! Resolving a mission records its outcome and announces the reward grant
//! on `exploration:completed`; crediting the grant to the player is left to
//! whoever reacts to that event.

use chrono::TimeDelta;
use estate_events::EventBus;
use estate_types::events::{
    MissionAvailableDetails, MissionCompletedDetails, MissionExpiredDetails, MissionStartedDetails,
};
use estate_types::{
    Difficulty, GameEvent, GameState, ItemGrant, LootEntry, Mission, MissionDifficulty, MissionId,
    MissionOutcome, MissionRequirements, MissionRewards, MissionRisk, MissionStatus,
    PlayerProfile, Rejection, RejectionReason, ResourceDelta, RewardGrant,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tracing::{debug, info};

use crate::config::ExplorationConfig;
use crate::engine::{Inbox, SubEngine, TickContext};
use crate::error::EngineError;
use crate::rng::SimRng;

/// Engine name used in logs and tick summaries.
pub const EXPLORATION_ENGINE: &str = "exploration";

/// Item granted when a successful mission rolls bonus loot.
pub const BONUS_LOOT_KEY: &str = "treasure_map";

/// Levels above the player's own at which missions are still offered.
pub const LEVEL_REACH: u32 = 2;

/// Extra reward per player level above 1.
const REWARD_SCALE_PER_LEVEL: f64 = 0.05;

/// Resolved missions older than this many days are dropped from state.
const RESOLVED_RETENTION_DAYS: u64 = 30;

const LOCATIONS: [&str; 8] = [
    "Abandoned Mill",
    "Old Lighthouse",
    "Sunken Cellar",
    "Ridge Caves",
    "Forgotten Warehouse",
    "Derelict Manor",
    "Flooded Quarry",
    "Clocktower Attic",
];

/// Generation parameters of one mission difficulty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionTemplate {
    /// Difficulty tier.
    pub difficulty: MissionDifficulty,
    /// Shortest duration in hours.
    pub min_hours: u32,
    /// Longest duration in hours.
    pub max_hours: u32,
    /// Base success probability.
    pub success_rate: f64,
    /// Minimum player level to start.
    pub min_level: u32,
    /// Entry fee in whole currency units.
    pub entry_cost: i64,
    /// Energy spent on start.
    pub energy_cost: u32,
    /// Base currency reward in whole units.
    pub currency: i64,
    /// Base experience reward.
    pub experience: u64,
    /// Reputation reward.
    pub reputation: i64,
    /// Inventory items that must be held to start.
    pub equipment: &'static [&'static str],
    /// Named risks and their probabilities.
    pub risks: &'static [(&'static str, f64)],
    /// Loot table: item key, quantity, chance.
    pub loot: &'static [(&'static str, u32, f64)],
}

/// The fixed difficulty table.
pub const fn template(difficulty: MissionDifficulty) -> MissionTemplate {
    match difficulty {
        MissionDifficulty::Easy => MissionTemplate {
            difficulty,
            min_hours: 2,
            max_hours: 4,
            success_rate: 0.85,
            min_level: 1,
            entry_cost: 100,
            energy_cost: 10,
            currency: 300,
            experience: 50,
            reputation: 1,
            equipment: &[],
            risks: &[],
            loot: &[("antique_coin", 1, 0.3)],
        },
        MissionDifficulty::Medium => MissionTemplate {
            difficulty,
            min_hours: 6,
            max_hours: 10,
            success_rate: 0.7,
            min_level: 3,
            entry_cost: 400,
            energy_cost: 20,
            currency: 1200,
            experience: 150,
            reputation: 2,
            equipment: &[],
            risks: &[("Bad weather", 0.1)],
            loot: &[("vintage_lamp", 1, 0.3)],
        },
        MissionDifficulty::Hard => MissionTemplate {
            difficulty,
            min_hours: 12,
            max_hours: 24,
            success_rate: 0.55,
            min_level: 6,
            entry_cost: 1000,
            energy_cost: 35,
            currency: 3500,
            experience: 400,
            reputation: 4,
            equipment: &["climbing_rope"],
            risks: &[("Rockfall", 0.15)],
            loot: &[("rare_gem", 1, 0.25)],
        },
        MissionDifficulty::Extreme => MissionTemplate {
            difficulty,
            min_hours: 24,
            max_hours: 48,
            success_rate: 0.4,
            min_level: 10,
            entry_cost: 2500,
            energy_cost: 50,
            currency: 9000,
            experience: 1000,
            reputation: 8,
            equipment: &["climbing_rope", "lantern"],
            risks: &[("Cave-in", 0.2), ("Getting lost", 0.1)],
            loot: &[("ancient_relic", 1, 0.2)],
        },
    }
}

/// Difficulties offered to a player of `level`.
pub fn eligible_difficulties(level: u32) -> Vec<MissionDifficulty> {
    let reach = level.saturating_add(LEVEL_REACH);
    MissionDifficulty::ALL
        .into_iter()
        .filter(|d| template(*d).min_level <= reach)
        .collect()
}

fn scale_decimal(value: Decimal, factor: f64) -> Decimal {
    Decimal::from_f64(factor)
        .and_then(|f| value.checked_mul(f))
        .unwrap_or(value)
        .round_dp(2)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scale_count(value: u64, factor: f64) -> u64 {
    (value as f64 * factor.max(0.0)).round() as u64
}

/// Build a fresh available mission for a player of `level`.
pub fn roll_mission(
    config: &ExplorationConfig,
    difficulty: MissionDifficulty,
    level: u32,
    day: u64,
    rng: &mut dyn SimRng,
) -> Mission {
    let t = template(difficulty);
    let spread = usize::try_from(t.max_hours.saturating_sub(t.min_hours)).unwrap_or(0);
    let extra = u32::try_from(rng.next_index(spread.saturating_add(1))).unwrap_or(0);
    let duration_hours = t.min_hours.saturating_add(extra);
    let location = LOCATIONS
        .get(rng.next_index(LOCATIONS.len()))
        .copied()
        .unwrap_or("Ridge Caves");
    let scale = 1.0 + REWARD_SCALE_PER_LEVEL * f64::from(level.saturating_sub(1));

    Mission {
        id: MissionId::new(),
        name: format!("{difficulty:?} expedition to the {location}"),
        location: location.to_owned(),
        difficulty,
        duration_hours,
        success_rate: t.success_rate,
        requirements: MissionRequirements {
            min_level: t.min_level,
            entry_cost: Decimal::from(t.entry_cost),
            energy_cost: t.energy_cost,
            equipment: t.equipment.iter().map(|s| (*s).to_owned()).collect(),
        },
        rewards: MissionRewards {
            currency: scale_decimal(Decimal::from(t.currency), scale),
            experience: scale_count(t.experience, scale),
            reputation: t.reputation,
            loot: t
                .loot
                .iter()
                .map(|(key, quantity, chance)| LootEntry {
                    item_key: (*key).to_owned(),
                    quantity: *quantity,
                    chance: *chance,
                })
                .collect(),
        },
        risks: t
            .risks
            .iter()
            .map(|(name, probability)| MissionRisk {
                name: (*name).to_owned(),
                probability: *probability,
            })
            .collect(),
        status: MissionStatus::Available,
        created_day: day,
        expires_day: day.saturating_add(config.mission_lifetime_days),
        started_at: None,
        estimated_end: None,
        outcome: None,
    }
}

/// Top the available pool up to `target_available` missions.
///
/// Returns the ids of the new missions.
pub fn generate_missions(
    config: &ExplorationConfig,
    state: &mut GameState,
    bus: &mut EventBus,
    rng: &mut dyn SimRng,
) -> Vec<MissionId> {
    let available = state.missions_with_status(MissionStatus::Available).count();
    let missing = config.target_available.saturating_sub(available);
    let level = state.player.level;
    let day = state.time.day();
    let tiers = eligible_difficulties(level);

    let mut created = Vec::with_capacity(missing);
    for _ in 0..missing {
        let Some(&difficulty) = tiers.get(rng.next_index(tiers.len())) else {
            break;
        };
        let mission = roll_mission(config, difficulty, level, day, rng);
        bus.emit(GameEvent::MissionAvailable(MissionAvailableDetails {
            mission_id: mission.id,
            name: mission.name.clone(),
            difficulty,
        }));
        created.push(mission.id);
        state.missions.insert(mission.id, mission);
    }
    if !created.is_empty() {
        debug!(count = created.len(), level, "missions generated");
    }
    created
}

/// Success probability for `player` attempting `mission`.
pub fn adjusted_success_rate(
    config: &ExplorationConfig,
    mission: &Mission,
    player: &PlayerProfile,
    difficulty: Difficulty,
) -> f64 {
    let levels_above = player.level.saturating_sub(mission.requirements.min_level);
    let level_bonus = (config.level_bonus_per_level * f64::from(levels_above)).min(config.level_bonus_cap);
    let experience_bonus = if config.experience_divisor > 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let experience = player.resources.experience as f64;
        (experience / config.experience_divisor).min(config.experience_bonus_cap)
    } else {
        0.0
    };
    let risk_penalty: f64 = mission
        .risks
        .iter()
        .map(|r| config.risk_weight * r.probability)
        .sum();

    (mission.success_rate + level_bonus + experience_bonus + difficulty.success_bonus() - risk_penalty)
        .clamp(config.min_success_rate, config.max_success_rate)
}

/// Begin an available mission.
///
/// Checks status, level, and equipment, then debits the entry cost and
/// energy in one step. Nothing changes when rejected.
pub fn start_mission(
    state: &mut GameState,
    bus: &mut EventBus,
    mission_id: MissionId,
) -> Result<MissionStartedDetails, Rejection> {
    let now = state.time.now();
    let mission = state.mission(mission_id)?;
    if mission.status != MissionStatus::Available {
        return Err(Rejection::new(
            RejectionReason::InvalidState,
            format!("{} is {:?}, not available", mission.name, mission.status),
        ));
    }
    let requirements = &mission.requirements;
    if state.player.level < requirements.min_level {
        return Err(Rejection::new(
            RejectionReason::InsufficientLevel,
            format!(
                "{} requires level {}, player is level {}",
                mission.name, requirements.min_level, state.player.level
            ),
        ));
    }
    if let Some(missing) = requirements
        .equipment
        .iter()
        .find(|item| state.player.item_count(item) == 0)
    {
        return Err(Rejection::new(
            RejectionReason::MissingEquipment,
            format!("{} requires {missing}", mission.name),
        ));
    }
    let estimated_end = TimeDelta::try_hours(i64::from(mission.duration_hours))
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| Rejection::new(RejectionReason::InvalidInput, "mission duration out of range"))?;
    let cost = ResourceDelta {
        currency: -requirements.entry_cost,
        energy: -i64::from(requirements.energy_cost),
        ..ResourceDelta::default()
    };

    state.player.apply_delta(&cost)?;
    let mission = state.mission_mut(mission_id)?;
    mission.transition(MissionStatus::InProgress)?;
    mission.started_at = Some(now);
    mission.estimated_end = Some(estimated_end);

    let details = MissionStartedDetails {
        mission_id,
        name: mission.name.clone(),
        estimated_end,
    };
    info!(%mission_id, %estimated_end, "mission started");
    bus.emit(GameEvent::MissionStarted(details.clone()));
    Ok(details)
}

fn success_grant(
    config: &ExplorationConfig,
    rewards: &MissionRewards,
    rng: &mut dyn SimRng,
) -> (RewardGrant, bool) {
    let variance = rng.uniform(config.reward_variance_low, config.reward_variance_high);
    let mut items: Vec<ItemGrant> = rewards
        .loot
        .iter()
        .filter(|entry| rng.chance(entry.chance))
        .map(|entry| ItemGrant {
            item_key: entry.item_key.clone(),
            quantity: entry.quantity,
        })
        .collect();
    let bonus_loot = rng.chance(config.bonus_loot_chance);
    if bonus_loot {
        items.push(ItemGrant {
            item_key: BONUS_LOOT_KEY.to_owned(),
            quantity: 1,
        });
    }
    let grant = RewardGrant {
        currency: scale_decimal(rewards.currency, variance),
        experience: scale_count(rewards.experience, variance),
        reputation: rewards.reputation,
        items,
        title: None,
    };
    (grant, bonus_loot)
}

fn consolation_grant(config: &ExplorationConfig, rewards: &MissionRewards) -> RewardGrant {
    RewardGrant {
        currency: scale_decimal(rewards.currency, config.consolation_fraction),
        experience: scale_count(rewards.experience, config.consolation_fraction),
        ..RewardGrant::default()
    }
}

/// Resolve an in-progress mission whose estimated end has passed.
///
/// The outcome is stored on the mission and announced on
/// `exploration:completed`. The player is not credited here.
pub fn complete_mission(
    config: &ExplorationConfig,
    state: &mut GameState,
    bus: &mut EventBus,
    rng: &mut dyn SimRng,
    mission_id: MissionId,
) -> Result<MissionOutcome, Rejection> {
    let now = state.time.now();
    let mission = state.mission(mission_id)?;
    if mission.status != MissionStatus::InProgress {
        return Err(Rejection::new(
            RejectionReason::InvalidState,
            format!("{} is {:?}, not in progress", mission.name, mission.status),
        ));
    }
    if mission.estimated_end.is_some_and(|end| end > now) {
        return Err(Rejection::new(
            RejectionReason::NotFinished,
            format!("{} has not finished yet", mission.name),
        ));
    }

    let adjusted_rate =
        adjusted_success_rate(config, mission, &state.player, state.settings.difficulty);
    let success = rng.chance(adjusted_rate);
    let (grant, bonus_loot) = if success {
        success_grant(config, &mission.rewards, rng)
    } else {
        (consolation_grant(config, &mission.rewards), false)
    };
    let outcome = MissionOutcome {
        success,
        cancelled: false,
        adjusted_rate,
        bonus_loot,
        grant,
        resolved_at: now,
    };

    let mission = state.mission_mut(mission_id)?;
    mission.transition(if success {
        MissionStatus::Completed
    } else {
        MissionStatus::Failed
    })?;
    mission.outcome = Some(outcome.clone());

    info!(%mission_id, success, adjusted_rate, "mission resolved");
    bus.emit(GameEvent::MissionCompleted(MissionCompletedDetails {
        mission_id,
        name: mission.name.clone(),
        success,
        bonus_loot,
        grant: outcome.grant.clone(),
    }));
    Ok(outcome)
}

/// Abandon an in-progress mission. Costs already paid are not refunded.
pub fn cancel_mission(state: &mut GameState, mission_id: MissionId) -> Result<(), Rejection> {
    let now = state.time.now();
    let mission = state.mission_mut(mission_id)?;
    if mission.status != MissionStatus::InProgress {
        return Err(Rejection::new(
            RejectionReason::InvalidState,
            format!("{} is {:?}, not in progress", mission.name, mission.status),
        ));
    }
    mission.transition(MissionStatus::Failed)?;
    mission.outcome = Some(MissionOutcome {
        success: false,
        cancelled: true,
        adjusted_rate: 0.0,
        bonus_loot: false,
        grant: RewardGrant::default(),
        resolved_at: now,
    });
    info!(%mission_id, "mission cancelled");
    Ok(())
}

/// Keeps the mission pool stocked and retires stale missions.
#[derive(Debug)]
pub struct ExplorationEngine {
    config: ExplorationConfig,
    level_ups: Inbox<u32>,
}

impl ExplorationEngine {
    /// Create the engine with the given tuning.
    pub fn new(config: ExplorationConfig) -> Self {
        Self {
            config,
            level_ups: Inbox::new(),
        }
    }

    /// Tuning in use.
    pub const fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    fn expire_stale(state: &mut GameState, bus: &mut EventBus, day: u64) {
        let stale: Vec<MissionId> = state
            .missions_with_status(MissionStatus::Available)
            .filter(|m| m.expires_day <= day)
            .map(|m| m.id)
            .collect();
        Self::expire(state, bus, stale);
        state.missions.retain(|_, m| {
            !m.status.is_terminal() || m.created_day.saturating_add(RESOLVED_RETENTION_DAYS) >= day
        });
    }

    /// Retire the untouched pool so offers match the player's new level.
    /// Missions already under way are left alone.
    fn refresh_pool(state: &mut GameState, bus: &mut EventBus, level: u32) {
        let offered: Vec<MissionId> = state
            .missions_with_status(MissionStatus::Available)
            .map(|m| m.id)
            .collect();
        let retired = Self::expire(state, bus, offered);
        debug!(level, retired, "mission pool refreshed");
    }

    /// Move each mission to expired and announce it. Returns how many moved.
    fn expire(state: &mut GameState, bus: &mut EventBus, missions: Vec<MissionId>) -> usize {
        let mut expired = 0_usize;
        for mission_id in missions {
            let Some(mission) = state.missions.get_mut(&mission_id) else {
                continue;
            };
            if mission.transition(MissionStatus::Expired).is_ok() {
                bus.emit(GameEvent::MissionExpired(MissionExpiredDetails {
                    mission_id,
                    name: mission.name.clone(),
                }));
                expired = expired.saturating_add(1);
            }
        }
        expired
    }
}

impl SubEngine for ExplorationEngine {
    fn name(&self) -> &'static str {
        EXPLORATION_ENGINE
    }

    fn initialize(&mut self, state: &GameState, bus: &mut EventBus) -> Result<(), EngineError> {
        if !self.level_ups.is_subscribed() {
            self.level_ups
                .subscribe(bus, "player:level_up", |event| match event {
                    GameEvent::LevelUp(details) => Some(details.new_level),
                    _ => None,
                });
        }
        info!(missions = state.missions.len(), "exploration engine initialized");
        Ok(())
    }

    fn update(&mut self, ctx: &mut TickContext<'_>) -> Result<(), EngineError> {
        let mut refill = false;
        if let Some(level) = self.level_ups.drain().into_iter().max() {
            Self::refresh_pool(ctx.state, ctx.bus, level);
            refill = true;
        }
        for day in ctx.delta.new_days() {
            Self::expire_stale(ctx.state, ctx.bus, day);
            refill = true;
        }
        let empty = ctx
            .state
            .missions_with_status(MissionStatus::Available)
            .next()
            .is_none();
        if refill || empty {
            generate_missions(&self.config, ctx.state, ctx.bus, ctx.rng);
        }
        Ok(())
    }

    fn cleanup(&mut self, bus: &mut EventBus) {
        self.level_ups.unsubscribe_all(bus);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use estate_types::events::LevelUpDetails;
    use estate_types::{GameSettings, GameTime};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::TickDelta;
    use crate::rng::ScriptedRng;

    fn world() -> GameState {
        GameState::new(
            PlayerProfile::new("Rowan"),
            GameTime::default(),
            GameSettings::default(),
        )
    }

    fn medium_mission() -> Mission {
        let mut rng = ScriptedRng::constant(0.0);
        let mut mission = roll_mission(
            &ExplorationConfig::default(),
            MissionDifficulty::Medium,
            1,
            0,
            &mut rng,
        );
        mission.risks.clear();
        mission
    }

    fn insert(state: &mut GameState, mission: Mission) -> MissionId {
        let id = mission.id;
        state.missions.insert(id, mission);
        id
    }

    fn tick(previous_day: u64, day: u64) -> TickDelta {
        TickDelta {
            tick: day * 24,
            elapsed_hours: 24,
            elapsed_days: 1.0,
            previous_day,
            day,
            now: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn eligibility_follows_player_level() {
        assert_eq!(
            eligible_difficulties(1),
            vec![MissionDifficulty::Easy, MissionDifficulty::Medium]
        );
        assert_eq!(eligible_difficulties(8).len(), 4);
    }

    #[test]
    fn adjusted_rate_without_bonuses_is_base_rate() {
        let state = world();
        let mut mission = medium_mission();
        mission.requirements.min_level = 1;
        let rate = adjusted_success_rate(
            &ExplorationConfig::default(),
            &mission,
            &state.player,
            Difficulty::Normal,
        );
        assert!((rate - 0.7).abs() < 1e-9);
    }

    #[test]
    fn adjusted_rate_is_capped_and_penalized() {
        let config = ExplorationConfig::default();
        let mut player = PlayerProfile::new("Rowan");
        player.level = 50;
        player.resources.experience = 1_000_000;
        let mission = medium_mission();
        let rate = adjusted_success_rate(&config, &mission, &player, Difficulty::Easy);
        assert!((rate - 0.95).abs() < 1e-9);

        let mut risky = medium_mission();
        risky.risks.push(MissionRisk {
            name: String::from("Flood"),
            probability: 2.0,
        });
        let rate = adjusted_success_rate(&config, &risky, &PlayerProfile::new("Rowan"), Difficulty::Hard);
        assert!((rate - 0.05).abs() < 1e-9);
    }

    #[test]
    fn success_frequency_tracks_rate() {
        let config = ExplorationConfig::default();
        let mut rng = SmallRng::seed_from_u64(2024);
        let mut successes = 0_u32;
        for _ in 0..1000 {
            let mut state = world();
            state.player.level = 3;
            let mut mission = medium_mission();
            mission.status = MissionStatus::InProgress;
            let id = insert(&mut state, mission);
            let mut bus = EventBus::new();
            let outcome = complete_mission(&config, &mut state, &mut bus, &mut rng, id).unwrap();
            if outcome.success {
                successes += 1;
            }
        }
        assert!((640..=760).contains(&successes), "{successes} successes");
    }

    #[test]
    fn generation_fills_pool_with_eligible_missions() {
        let mut state = world();
        let mut bus = EventBus::new();
        let mut rng = SmallRng::seed_from_u64(5);
        let config = ExplorationConfig::default();
        let created = generate_missions(&config, &mut state, &mut bus, &mut rng);
        assert_eq!(created.len(), config.target_available);
        for mission in state.missions.values() {
            assert!(mission.requirements.min_level <= 1 + LEVEL_REACH);
            assert_eq!(mission.expires_day, config.mission_lifetime_days);
            let t = template(mission.difficulty);
            assert!((t.min_hours..=t.max_hours).contains(&mission.duration_hours));
        }
        assert_eq!(bus.emitted_count(), 4);
        assert!(generate_missions(&config, &mut state, &mut bus, &mut rng).is_empty());
    }

    #[test]
    fn start_validates_and_debits() {
        let mut state = world();
        let mut bus = EventBus::new();
        let mission = medium_mission();
        let (cost, energy, hours) = (
            mission.requirements.entry_cost,
            mission.requirements.energy_cost,
            mission.duration_hours,
        );
        let id = insert(&mut state, mission);

        let too_low = start_mission(&mut state, &mut bus, id).unwrap_err();
        assert_eq!(too_low.reason, RejectionReason::InsufficientLevel);

        state.player.level = 3;
        state.player.resources.currency = Decimal::new(10, 0);
        let broke = start_mission(&mut state, &mut bus, id).unwrap_err();
        assert_eq!(broke.reason, RejectionReason::InsufficientFunds);
        assert_eq!(state.mission(id).unwrap().status, MissionStatus::Available);
        assert_eq!(state.player.resources.energy, 100);

        state.player.resources.currency = Decimal::new(1000, 0);
        let started = start_mission(&mut state, &mut bus, id).unwrap();
        let now = state.time.now();
        assert_eq!(started.estimated_end, now + TimeDelta::hours(i64::from(hours)));
        assert_eq!(state.player.resources.currency, Decimal::new(1000, 0) - cost);
        assert_eq!(state.player.resources.energy, 100 - energy);
        assert_eq!(state.mission(id).unwrap().status, MissionStatus::InProgress);

        let again = start_mission(&mut state, &mut bus, id).unwrap_err();
        assert_eq!(again.reason, RejectionReason::InvalidState);
    }

    #[test]
    fn missing_equipment_is_rejected() {
        let mut state = world();
        state.player.level = 10;
        let mut bus = EventBus::new();
        let mut rng = ScriptedRng::constant(0.0);
        let mission = roll_mission(&ExplorationConfig::default(), MissionDifficulty::Hard, 10, 0, &mut rng);
        let id = insert(&mut state, mission);

        let rejection = start_mission(&mut state, &mut bus, id).unwrap_err();
        assert_eq!(rejection.reason, RejectionReason::MissingEquipment);

        state.player.add_item("climbing_rope", 1);
        assert!(start_mission(&mut state, &mut bus, id).is_ok());
    }

    #[test]
    fn completion_waits_for_estimated_end() {
        let config = ExplorationConfig::default();
        let mut state = world();
        state.player.level = 3;
        let mut bus = EventBus::new();
        let mission = medium_mission();
        let hours = u64::from(mission.duration_hours);
        let id = insert(&mut state, mission);
        start_mission(&mut state, &mut bus, id).unwrap();

        let mut rng = ScriptedRng::constant(0.0);
        let early = complete_mission(&config, &mut state, &mut bus, &mut rng, id).unwrap_err();
        assert_eq!(early.reason, RejectionReason::NotFinished);

        state.time.elapsed_hours = hours;
        let outcome = complete_mission(&config, &mut state, &mut bus, &mut rng, id).unwrap();
        assert!(outcome.success);
        assert!(outcome.bonus_loot);
        assert_eq!(state.mission(id).unwrap().status, MissionStatus::Completed);
    }

    #[test]
    fn success_grant_is_scaled_and_not_applied() {
        let config = ExplorationConfig::default();
        let mut state = world();
        let mut mission = medium_mission();
        mission.status = MissionStatus::InProgress;
        let base = mission.rewards.currency;
        let id = insert(&mut state, mission);
        let mut bus = EventBus::new();
        let before = state.player.resources.clone();

        let mut rng = ScriptedRng::constant(0.0);
        let outcome = complete_mission(&config, &mut state, &mut bus, &mut rng, id).unwrap();
        assert_eq!(outcome.grant.currency, (base * Decimal::new(8, 1)).round_dp(2));
        assert!(outcome.grant.items.iter().any(|i| i.item_key == BONUS_LOOT_KEY));
        assert!(outcome.grant.items.iter().any(|i| i.item_key == "vintage_lamp"));
        assert_eq!(state.player.resources, before);

        let events = bus.drain_journal();
        assert!(matches!(
            events.first(),
            Some(GameEvent::MissionCompleted(details)) if details.success && details.grant == outcome.grant
        ));
    }

    #[test]
    fn failure_pays_consolation() {
        let config = ExplorationConfig::default();
        let mut state = world();
        let mut mission = medium_mission();
        mission.status = MissionStatus::InProgress;
        let (currency, experience) = (mission.rewards.currency, mission.rewards.experience);
        let id = insert(&mut state, mission);
        let mut bus = EventBus::new();

        let mut rng = ScriptedRng::constant(0.99);
        let outcome = complete_mission(&config, &mut state, &mut bus, &mut rng, id).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.grant.currency, (currency * Decimal::new(15, 2)).round_dp(2));
        assert_eq!(outcome.grant.experience, scale_count(experience, 0.15));
        assert!(outcome.grant.items.is_empty());
        assert_eq!(state.mission(id).unwrap().status, MissionStatus::Failed);
    }

    #[test]
    fn cancel_fails_without_refund() {
        let mut state = world();
        state.player.level = 3;
        let mut bus = EventBus::new();
        let id = insert(&mut state, medium_mission());
        start_mission(&mut state, &mut bus, id).unwrap();
        let currency = state.player.resources.currency;

        cancel_mission(&mut state, id).unwrap();
        let mission = state.mission(id).unwrap();
        assert_eq!(mission.status, MissionStatus::Failed);
        assert!(mission.outcome.as_ref().unwrap().cancelled);
        assert_eq!(state.player.resources.currency, currency);

        let again = cancel_mission(&mut state, id).unwrap_err();
        assert_eq!(again.reason, RejectionReason::InvalidState);
    }

    #[test]
    fn update_expires_and_refills() {
        let config = ExplorationConfig::default();
        let mut state = world();
        let mut engine = ExplorationEngine::new(config.clone());
        let mut bus = EventBus::new();
        engine.initialize(&state, &mut bus).unwrap();
        let mut rng = SmallRng::seed_from_u64(9);
        let original = generate_missions(&config, &mut state, &mut bus, &mut rng);
        bus.clear_journal();

        let lifetime = config.mission_lifetime_days;
        let mut ctx = TickContext {
            state: &mut state,
            bus: &mut bus,
            rng: &mut rng,
            delta: tick(lifetime - 1, lifetime),
        };
        engine.update(&mut ctx).unwrap();

        let expired = bus
            .journal()
            .iter()
            .filter(|e| matches!(e, GameEvent::MissionExpired(_)))
            .count();
        assert_eq!(expired, original.len());
        for id in &original {
            assert_eq!(state.mission(*id).unwrap().status, MissionStatus::Expired);
        }
        assert_eq!(
            state.missions_with_status(MissionStatus::Available).count(),
            config.target_available
        );
    }

    #[test]
    fn level_up_retires_the_offered_pool() {
        let config = ExplorationConfig::default();
        let mut state = world();
        let mut engine = ExplorationEngine::new(config.clone());
        let mut bus = EventBus::new();
        engine.initialize(&state, &mut bus).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let original = generate_missions(&config, &mut state, &mut bus, &mut rng);
        let underway = insert(&mut state, medium_mission());
        state.player.level = 3;
        start_mission(&mut state, &mut bus, underway).unwrap();

        state.player.level = 8;
        bus.emit(GameEvent::LevelUp(LevelUpDetails {
            player_id: state.player.id,
            previous_level: 1,
            new_level: 8,
        }));
        bus.clear_journal();
        let mut ctx = TickContext {
            state: &mut state,
            bus: &mut bus,
            rng: &mut rng,
            delta: tick(0, 0),
        };
        engine.update(&mut ctx).unwrap();

        let expired: Vec<MissionId> = bus
            .journal()
            .iter()
            .filter_map(|e| match e {
                GameEvent::MissionExpired(details) => Some(details.mission_id),
                _ => None,
            })
            .collect();
        assert_eq!(expired.len(), original.len());
        for id in &original {
            assert!(expired.contains(id));
            assert_eq!(state.mission(*id).unwrap().status, MissionStatus::Expired);
        }
        assert_eq!(state.mission(underway).unwrap().status, MissionStatus::InProgress);
        assert_eq!(
            state.missions_with_status(MissionStatus::Available).count(),
            config.target_available
        );
        engine.cleanup(&mut bus);
        assert_eq!(bus.listener_count("player:level_up"), 0);
    }
}
