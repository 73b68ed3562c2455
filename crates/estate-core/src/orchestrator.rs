//! The orchestrator: sole owner of the game state and driver of the tick.
//!
//! One [`Orchestrator`] is built from a [`SimulationConfig`] and holds the
//! [`GameState`], the [`EventBus`], the [`Scheduler`], the registered
//! [`SubEngine`]s, and the [`NotificationEngine`]. Every mutation of the
//! state goes through it: either inside [`Orchestrator::tick`] or through
//! one of the player-facing operations in `commands`.
//!
//! # Tick phases
//!
//! 1. **Clock** -- advance simulated time, announce `game:day_passed`,
//!    restore daily energy
//! 2. **Scheduler** -- fire due tasks (mission resolution, sweeps, autosave)
//! 3. **Engines** -- update every engine in registration order; a failing
//!    engine is logged and recorded, its siblings still run
//! 4. **Reaction** -- drain the bus journal and feed each event to the
//!    resource effects, the achievement engine, and the notification
//!    engine, repeating until the journal is empty or the cascade limit
//!    is hit
//! 5. **Level** -- promote the player when experience crosses a threshold
//!
//! Operations outside a tick run the same reaction stage before returning,
//! so achievements and notifications never lag behind a player action.

use chrono::{DateTime, Utc};
use estate_achievements::{AchievementEngine, WorldSnapshot, default_catalog};
use estate_engines::{
    EngineError, ExplorationEngine, MarketEngine, SubEngine, TenantEngine, TickContext, TickDelta,
    exploration,
};
use estate_events::{EventBus, Scheduler};
use estate_notify::{NotificationEngine, NotificationError};
use estate_store::{SaveFile, SaveStore, StoreError};
use estate_types::events::{
    DayPassedDetails, LevelUpDetails, ResourcesChangedDetails, SaveFailedDetails, SaveSlotDetails,
};
use estate_types::player::level_for_experience;
use estate_types::{
    GameEvent, GamePhase, GameState, Mission, MissionId, MissionStatus, RejectionReason,
    ResourceDelta, TaskId,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, GameClock};
use crate::config::SimulationConfig;
use crate::seed;

/// Task id of the recurring notification sweep.
const SWEEP_TASK: &str = "notifications:sweep";

/// Task id of the recurring autosave.
const AUTOSAVE_TASK: &str = "game:autosave";

/// Errors that can occur while building or driving the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An engine could not be initialized.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// The notification engine could not be built.
    #[error("notification error: {source}")]
    Notification {
        /// The underlying notification error.
        #[from]
        source: NotificationError,
    },

    /// Loading a save failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// Work the orchestrator schedules for a later tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScheduledAction {
    /// Resolve an in-progress mission once its duration has elapsed.
    ResolveMission {
        /// Mission to resolve.
        mission_id: MissionId,
    },
    /// Archive, expire, and purge notifications.
    SweepNotifications,
    /// Ask the runner to write the autosave slot.
    Autosave,
}

/// One engine update that failed during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    /// Name of the failing engine.
    pub engine: &'static str,
    /// Rendered error.
    pub error: String,
}

/// What happened during one call to [`Orchestrator::tick`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Tick number after the call.
    pub tick: u64,
    /// Simulated day after the call.
    pub day: u64,
    /// Whether time advanced (false unless the game is running).
    pub advanced: bool,
    /// Events fed through the reaction stage.
    pub events: usize,
    /// Engines whose update failed.
    pub engine_failures: Vec<EngineFailure>,
    /// Missions resolved by the scheduler.
    pub resolved_missions: Vec<MissionId>,
    /// Levels gained.
    pub level_ups: u32,
    /// The autosave interval elapsed; the runner should save.
    pub autosave_due: bool,
    /// The reaction stage hit the cascade limit and dropped events.
    pub cascade_truncated: bool,
}

/// Counters from one run of the reaction stage.
#[derive(Debug, Clone, Copy, Default)]
struct Reaction {
    events: usize,
    level_ups: u32,
    truncated: bool,
}

/// Owns the game and advances it.
pub struct Orchestrator {
    pub(crate) config: SimulationConfig,
    pub(crate) state: GameState,
    pub(crate) bus: EventBus,
    pub(crate) scheduler: Scheduler<ScheduledAction>,
    engines: Vec<Box<dyn SubEngine>>,
    pub(crate) notifications: NotificationEngine,
    pub(crate) clock: GameClock,
    pub(crate) rng: StdRng,
}

impl core::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("tick", &self.state.time.tick)
            .field("phase", &self.state.phase)
            .field("engines", &self.engine_names())
            .field("pending_tasks", &self.scheduler.len())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Start a new game as configured: the starter world, or an empty one.
    pub fn new(config: SimulationConfig) -> Result<Self, OrchestratorError> {
        let state = if config.game.starter_world {
            seed::starter_world(&config)
        } else {
            seed::new_game(&config)
        };
        Self::with_state(config, state)
    }

    /// Build an orchestrator around an existing state.
    ///
    /// Registers the tenant, market, and exploration engines (in that
    /// order), the default achievement catalog, and the recurring tasks.
    /// In-progress missions get their resolution rescheduled.
    pub fn with_state(config: SimulationConfig, state: GameState) -> Result<Self, OrchestratorError> {
        let clock = GameClock::new(&config.game)?;
        let mut notifications = NotificationEngine::new(config.notifications.clone())?;
        notifications.set_default_channels(state.settings.default_channels.clone());
        let rng = seeded_rng(config.game.seed, state.time.tick);
        let mut orchestrator = Self {
            config,
            state,
            bus: EventBus::new(),
            scheduler: Scheduler::new(),
            engines: Vec::new(),
            notifications,
            clock,
            rng,
        };

        orchestrator.register_catalog();
        let tenants = TenantEngine::new(orchestrator.config.tenants.clone());
        let market = MarketEngine::new(orchestrator.config.market.clone());
        let exploration = ExplorationEngine::new(orchestrator.config.exploration.clone());
        orchestrator.register_engine(Box::new(tenants))?;
        orchestrator.register_engine(Box::new(market))?;
        orchestrator.register_engine(Box::new(exploration))?;
        orchestrator.rebuild_schedule();

        info!(
            player = %orchestrator.state.player.name,
            tick = orchestrator.state.time.tick,
            properties = orchestrator.state.properties.len(),
            tenants = orchestrator.state.tenants.len(),
            "orchestrator ready"
        );
        Ok(orchestrator)
    }

    /// Add an engine after the built-in ones. It runs last in every tick.
    pub fn register_engine(&mut self, mut engine: Box<dyn SubEngine>) -> Result<(), OrchestratorError> {
        engine.initialize(&self.state, &mut self.bus)?;
        info!(engine = engine.name(), "engine registered");
        self.engines.push(engine);
        Ok(())
    }

    /// Names of the registered engines in update order.
    pub fn engine_names(&self) -> Vec<&'static str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Read-only view of the game.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The configuration in use.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The event bus, for subscribing with `on` / `off`.
    pub const fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// The task scheduler.
    pub const fn scheduler(&self) -> &Scheduler<ScheduledAction> {
        &self.scheduler
    }

    /// Current simulated instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.state.time.now()
    }

    /// Unsubscribe every engine from the bus.
    pub fn shutdown(&mut self) {
        for engine in &mut self.engines {
            engine.cleanup(&mut self.bus);
        }
        info!(tick = self.state.time.tick, "orchestrator shut down");
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick covering `hours` simulated hours.
    ///
    /// Outside [`GamePhase::Running`] nothing changes and the summary
    /// reports `advanced = false`.
    pub fn tick(&mut self, hours: u64) -> Result<TickSummary, OrchestratorError> {
        if self.state.phase != GamePhase::Running {
            debug!(phase = ?self.state.phase, "tick skipped");
            return Ok(TickSummary {
                tick: self.state.time.tick,
                day: self.state.time.day(),
                ..TickSummary::default()
            });
        }

        let delta = self.clock.advance(&mut self.state.time, hours)?;
        let mut summary = TickSummary {
            tick: delta.tick,
            day: delta.day,
            advanced: true,
            ..TickSummary::default()
        };
        let new_days = delta.new_days();
        let days_passed = new_days.end.saturating_sub(new_days.start);
        for day in new_days {
            self.bus.emit(GameEvent::DayPassed(DayPassedDetails { day }));
        }
        self.regenerate_energy(days_passed);

        // A tick longer than `hours_per_tick` counts down several scheduler steps.
        let steps = self.clock.ticks_for_hours(hours).max(1);
        for (_, action) in self.scheduler.update(steps) {
            self.run_action(action, &mut summary);
        }

        self.update_engines(delta, &mut summary);

        let reaction = self.react();
        summary.events = reaction.events;
        summary.level_ups = reaction.level_ups;
        summary.cascade_truncated = reaction.truncated;

        debug!(
            tick = summary.tick,
            day = summary.day,
            events = summary.events,
            failures = summary.engine_failures.len(),
            "tick complete"
        );
        Ok(summary)
    }

    /// Restore the player's energy for `days` day rollovers, up to the cap.
    fn regenerate_energy(&mut self, days: u64) {
        let per_day = u64::from(self.config.game.energy_regen_per_day);
        let resources = &self.state.player.resources;
        let missing = u64::from(resources.max_energy.saturating_sub(resources.energy));
        let gain = per_day.saturating_mul(days).min(missing);
        if gain == 0 {
            return;
        }
        let delta = ResourceDelta {
            energy: i64::try_from(gain).unwrap_or(i64::MAX),
            ..ResourceDelta::default()
        };
        if let Err(rejection) = self.state.player.apply_delta(&delta) {
            warn!(%rejection, "energy not restored");
            return;
        }
        debug!(gain, energy = self.state.player.resources.energy, "energy restored");
        self.bus.emit(GameEvent::ResourcesChanged(ResourcesChangedDetails {
            player_id: self.state.player.id,
            delta,
            resources: self.state.player.resources.clone(),
        }));
    }

    fn update_engines(&mut self, delta: TickDelta, summary: &mut TickSummary) {
        for engine in &mut self.engines {
            let mut ctx = TickContext {
                state: &mut self.state,
                bus: &mut self.bus,
                rng: &mut self.rng,
                delta,
            };
            if let Err(error) = engine.update(&mut ctx) {
                warn!(engine = engine.name(), tick = delta.tick, %error, "engine update failed");
                summary.engine_failures.push(EngineFailure {
                    engine: engine.name(),
                    error: error.to_string(),
                });
            }
        }
    }

    // -----------------------------------------------------------------------
    // Scheduler
    // -----------------------------------------------------------------------

    fn run_action(&mut self, action: ScheduledAction, summary: &mut TickSummary) {
        match action {
            ScheduledAction::ResolveMission { mission_id } => {
                self.resolve_scheduled_mission(mission_id, summary);
            }
            ScheduledAction::SweepNotifications => {
                let now = self.state.time.now();
                self.notifications.sweep(&mut self.state.notifications, now);
                self.schedule_sweep();
            }
            ScheduledAction::Autosave => {
                summary.autosave_due = true;
                self.schedule_autosave();
            }
        }
    }

    fn resolve_scheduled_mission(&mut self, mission_id: MissionId, summary: &mut TickSummary) {
        let result = exploration::complete_mission(
            &self.config.exploration,
            &mut self.state,
            &mut self.bus,
            &mut self.rng,
            mission_id,
        );
        match result {
            Ok(outcome) => {
                debug!(%mission_id, success = outcome.success, "scheduled mission resolved");
                summary.resolved_missions.push(mission_id);
            }
            Err(rejection) if rejection.reason == RejectionReason::NotFinished => {
                let now = self.state.time.now();
                let hours = self
                    .state
                    .mission(mission_id)
                    .map_or(0, |mission| remaining_hours(mission, now));
                self.schedule_resolution(mission_id, hours);
            }
            Err(rejection) => {
                debug!(%mission_id, %rejection, "scheduled resolution skipped");
            }
        }
    }

    /// Queue the resolution of `mission_id` after `hours` simulated hours.
    pub(crate) fn schedule_resolution(&mut self, mission_id: MissionId, hours: u64) {
        let delay = self.clock.ticks_for_hours(hours);
        self.scheduler.schedule(
            mission_task(mission_id),
            ScheduledAction::ResolveMission { mission_id },
            delay,
        );
    }

    pub(crate) fn cancel_resolution(&mut self, mission_id: MissionId) -> bool {
        self.scheduler.cancel(&mission_task(mission_id))
    }

    fn schedule_sweep(&mut self) {
        let interval = self.config.game.notification_sweep_interval_ticks;
        if interval > 0 {
            self.scheduler
                .schedule(TaskId::new(SWEEP_TASK), ScheduledAction::SweepNotifications, interval);
        }
    }

    fn schedule_autosave(&mut self) {
        let interval = self.state.settings.autosave_interval_ticks;
        if interval > 0 {
            self.scheduler
                .schedule(TaskId::new(AUTOSAVE_TASK), ScheduledAction::Autosave, interval);
        }
    }

    /// Recreate every pending task from the state.
    fn rebuild_schedule(&mut self) {
        self.scheduler.clear();
        self.schedule_sweep();
        self.schedule_autosave();

        let now = self.state.time.now();
        let in_flight: Vec<(MissionId, u64)> = self
            .state
            .missions_with_status(MissionStatus::InProgress)
            .map(|mission| (mission.id, remaining_hours(mission, now)))
            .collect();
        for (mission_id, hours) in in_flight {
            self.schedule_resolution(mission_id, hours);
        }
        debug!(pending = self.scheduler.len(), "schedule rebuilt");
    }

    // -----------------------------------------------------------------------
    // Reaction stage
    // -----------------------------------------------------------------------

    /// Run the reaction stage outside a tick.
    pub(crate) fn settle(&mut self) {
        self.react();
    }

    fn react(&mut self) -> Reaction {
        let mut reaction = Reaction::default();
        let max_rounds = self.config.game.max_cascade_rounds;
        let mut round = 0_u32;
        loop {
            self.check_level_up(&mut reaction);
            if self.bus.journal().is_empty() {
                break;
            }
            if round >= max_rounds {
                warn!(
                    rounds = round,
                    dropped = self.bus.journal().len(),
                    "reaction cascade cut off"
                );
                self.bus.clear_journal();
                reaction.truncated = true;
                break;
            }
            round = round.saturating_add(1);
            for event in self.bus.drain_journal() {
                self.react_to(&event);
                reaction.events = reaction.events.saturating_add(1);
            }
        }
        reaction
    }

    fn react_to(&mut self, event: &GameEvent) {
        let topic = event.topic();
        self.bus.begin_reaction(topic);

        self.apply_resource_effects(event);

        let world = WorldSnapshot::of(&self.state);
        let now = self.state.time.now();
        let completed = AchievementEngine::new(&mut self.state.achievements, &mut self.bus, now)
            .handle_event(event, &world);
        if !completed.is_empty() {
            debug!(topic, count = completed.len(), "achievements completed");
        }

        if let Err(error) = self.notifications.handle_event(
            &mut self.state.notifications,
            &mut self.bus,
            event,
            &self.state.player,
            now,
        ) {
            warn!(topic, %error, "notification for event failed");
        }

        self.bus.end_reaction(topic);
    }

    fn apply_resource_effects(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RentPaid(details) => {
                let credit = ResourceDelta::currency(details.amount);
                if let Err(rejection) = self.state.player.apply_delta(&credit) {
                    warn!(tenant = %details.tenant_id, %rejection, "rent not credited");
                }
            }
            GameEvent::MissionCompleted(details) => {
                self.state.player.apply_grant(&details.grant);
            }
            _ => {}
        }
    }

    fn check_level_up(&mut self, reaction: &mut Reaction) {
        let player = &mut self.state.player;
        let level = level_for_experience(player.resources.experience);
        if level <= player.level {
            return;
        }
        let previous_level = player.level;
        player.level = level;
        info!(previous_level, level, "player leveled up");
        self.bus.emit(GameEvent::LevelUp(LevelUpDetails {
            player_id: player.id,
            previous_level,
            new_level: level,
        }));
        reaction.level_ups = reaction.level_ups.saturating_add(1);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the current state to `slot`.
    ///
    /// Emits `game:saved` on success. On failure emits `game:save_failed`
    /// (which raises an urgent notification) and returns the error.
    pub async fn save<S: SaveStore>(&mut self, store: &S, slot: &str) -> Result<(), StoreError> {
        let file = SaveFile::capture(slot, &self.state);
        let tick = self.state.time.tick;
        match store.save(&file).await {
            Ok(()) => {
                info!(slot, tick, "game saved");
                self.bus.emit(GameEvent::GameSaved(SaveSlotDetails {
                    slot: slot.to_owned(),
                    tick,
                }));
                self.settle();
                Ok(())
            }
            Err(error) => {
                warn!(slot, tick, %error, "save failed");
                self.bus.emit(GameEvent::SaveFailed(SaveFailedDetails {
                    slot: slot.to_owned(),
                    error: error.to_string(),
                }));
                self.settle();
                Err(error)
            }
        }
    }

    /// Replace the current game with the save in `slot`.
    ///
    /// Returns `Ok(false)` if the slot is empty; the current game is kept.
    pub async fn load<S: SaveStore>(&mut self, store: &S, slot: &str) -> Result<bool, OrchestratorError> {
        let Some(file) = store.load(slot).await? else {
            info!(slot, "save slot empty");
            return Ok(false);
        };
        self.restore(file.state)?;
        let tick = self.state.time.tick;
        info!(slot, tick, "game loaded");
        self.bus.emit(GameEvent::GameLoaded(SaveSlotDetails {
            slot: slot.to_owned(),
            tick,
        }));
        self.settle();
        Ok(true)
    }

    /// Swap in `state` and rewire everything that depends on it.
    ///
    /// A running or stopped game comes back paused.
    pub fn restore(&mut self, mut state: GameState) -> Result<(), OrchestratorError> {
        if matches!(state.phase, GamePhase::Running | GamePhase::Stopped) {
            state.phase = GamePhase::Paused;
        }
        for engine in &mut self.engines {
            engine.cleanup(&mut self.bus);
        }
        self.bus.clear_journal();

        self.state = state;
        self.rng = seeded_rng(self.config.game.seed, self.state.time.tick);
        self.notifications
            .set_default_channels(self.state.settings.default_channels.clone());
        self.register_catalog();
        for engine in &mut self.engines {
            engine.initialize(&self.state, &mut self.bus)?;
        }
        self.rebuild_schedule();
        Ok(())
    }

    fn register_catalog(&mut self) {
        let now = self.state.time.now();
        let added = AchievementEngine::new(&mut self.state.achievements, &mut self.bus, now)
            .register_missing(default_catalog());
        debug!(added, "achievement catalog registered");
    }
}

/// Seed for a game resumed at `tick`, so a loaded save does not replay the
/// random sequence from the start.
fn seeded_rng(seed: u64, tick: u64) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(tick))
}

fn mission_task(mission_id: MissionId) -> TaskId {
    TaskId::new(format!("mission:{mission_id}"))
}

/// Whole simulated hours until `mission` may be completed.
fn remaining_hours(mission: &Mission, now: DateTime<Utc>) -> u64 {
    mission
        .estimated_end
        .map(|end| end.signed_duration_since(now).num_hours())
        .and_then(|hours| u64::try_from(hours).ok())
        .unwrap_or(0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use estate_notify::{NotificationRequest, SendOutcome};
    use estate_types::{ChannelKind, GameEvent, GamePhase, NotificationPriority, NotificationType};

    use super::*;

    fn running() -> Orchestrator {
        let mut orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
        orchestrator.set_phase(GamePhase::Running).unwrap();
        orchestrator
    }

    #[test]
    fn engines_register_in_order() {
        let orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
        assert_eq!(orchestrator.engine_names(), vec!["tenants", "market", "exploration"]);
        assert!(!orchestrator.state().achievements.definitions.is_empty());
    }

    #[test]
    fn setup_phase_does_not_tick() {
        let mut orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
        let summary = orchestrator.tick(1).unwrap();
        assert!(!summary.advanced);
        assert_eq!(orchestrator.state().time.tick, 0);
    }

    #[test]
    fn tick_advances_clock_and_stocks_missions() {
        let mut orchestrator = running();
        let summary = orchestrator.tick(1).unwrap();
        assert!(summary.advanced);
        assert_eq!(summary.tick, 1);
        assert!(summary.engine_failures.is_empty());
        assert!(
            orchestrator
                .state()
                .missions_with_status(MissionStatus::Available)
                .next()
                .is_some()
        );
    }

    #[test]
    fn day_rollover_is_announced() {
        let mut orchestrator = running();
        let days = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
        let seen = std::sync::Arc::clone(&days);
        orchestrator.bus_mut().on("game:day_passed", move |event: &GameEvent| {
            if let GameEvent::DayPassed(details) = event {
                seen.store(details.day, std::sync::atomic::Ordering::SeqCst);
            }
            Ok(())
        });
        for _ in 0..24 {
            orchestrator.tick(1).unwrap();
        }
        assert_eq!(days.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn autosave_comes_due_on_interval() {
        let mut config = SimulationConfig::default();
        config.game.autosave_interval_ticks = 3;
        let mut orchestrator = Orchestrator::new(config).unwrap();
        orchestrator.set_phase(GamePhase::Running).unwrap();
        let due: Vec<bool> = (0..6)
            .map(|_| orchestrator.tick(1).unwrap().autosave_due)
            .collect();
        assert_eq!(due, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn level_up_follows_experience() {
        let mut orchestrator = running();
        orchestrator
            .update_player_resources(ResourceDelta {
                experience: 450,
                ..ResourceDelta::default()
            })
            .unwrap();
        // 400 experience reaches level 3.
        assert_eq!(orchestrator.state().player.level, 3);
    }

    #[test]
    fn energy_regenerates_at_day_rollover() {
        let mut orchestrator = running();
        let changes = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(0));
        let seen = std::sync::Arc::clone(&changes);
        orchestrator.bus_mut().on("player:resources_changed", move |_event: &GameEvent| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        });

        orchestrator.state.player.resources.energy = 10;
        for _ in 0..23 {
            orchestrator.tick(1).unwrap();
        }
        assert_eq!(orchestrator.state().player.resources.energy, 10);
        orchestrator.tick(1).unwrap();
        assert_eq!(orchestrator.state().player.resources.energy, 35);

        orchestrator.state.player.resources.energy = 90;
        orchestrator.tick(24).unwrap();
        assert_eq!(orchestrator.state().player.resources.energy, 100);
        orchestrator.tick(24).unwrap();
        assert_eq!(orchestrator.state().player.resources.energy, 100);
        assert_eq!(changes.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    fn delivery_channels(orchestrator: &mut Orchestrator) -> Vec<ChannelKind> {
        let request = NotificationRequest {
            player_id: orchestrator.state().player.id,
            kind: NotificationType::System,
            priority: NotificationPriority::Normal,
            title: String::from("Ping"),
            message: String::from("Channel check."),
            data: serde_json::Value::Null,
        };
        let SendOutcome::Delivered(id) = orchestrator.send_notification(request) else {
            panic!("notification was not delivered");
        };
        orchestrator.state().notifications.notifications[&id].channels.clone()
    }

    #[test]
    fn saved_default_channels_drive_delivery() {
        let config = SimulationConfig::default();
        let mut state = seed::new_game(&config);
        state.settings.default_channels = vec![ChannelKind::InApp, ChannelKind::Push];
        let mut built = Orchestrator::with_state(config.clone(), state).unwrap();
        assert_eq!(
            delivery_channels(&mut built),
            vec![ChannelKind::InApp, ChannelKind::Push]
        );

        let mut restored = Orchestrator::new(config.clone()).unwrap();
        let mut saved = seed::new_game(&config);
        saved.settings.default_channels = vec![ChannelKind::Email];
        restored.restore(saved).unwrap();
        assert_eq!(delivery_channels(&mut restored), vec![ChannelKind::Email]);
    }

    #[test]
    fn remaining_hours_counts_down_to_zero() {
        let mut orchestrator = running();
        orchestrator.tick(1).unwrap();
        let mut mission = orchestrator
            .state()
            .missions_with_status(MissionStatus::Available)
            .next()
            .cloned()
            .unwrap();
        let now = orchestrator.now();
        mission.estimated_end = now.checked_add_signed(chrono::TimeDelta::hours(5));
        assert_eq!(remaining_hours(&mission, now), 5);
        mission.estimated_end = Some(now);
        assert_eq!(remaining_hours(&mission, now), 0);
    }
}
