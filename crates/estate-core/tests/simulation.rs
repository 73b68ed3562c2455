//! End-to-end tests for the orchestrator: engine isolation, persistence,
//! and long runs through the tick loop.

#![allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use estate_core::{FixedTickSource, Orchestrator, SimulationConfig, run_simulation};
use estate_engines::{EngineError, SubEngine, TickContext};
use estate_events::EventBus;
use estate_store::{MemoryStore, SaveFile, SaveStore, StoreError};
use estate_types::{
    GameEvent, GamePhase, GameState, NotificationPriority, NotificationType, ProductId,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Fails every update.
struct BrokenEngine;

impl SubEngine for BrokenEngine {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn initialize(&mut self, _state: &GameState, _bus: &mut EventBus) -> Result<(), EngineError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EngineError> {
        Err(EngineError::Failed {
            engine: "broken",
            reason: String::from("always fails"),
        })
    }

    fn cleanup(&mut self, _bus: &mut EventBus) {}
}

/// Counts its updates.
struct CountingEngine {
    updates: Arc<AtomicU64>,
}

impl SubEngine for CountingEngine {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn initialize(&mut self, _state: &GameState, _bus: &mut EventBus) -> Result<(), EngineError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut TickContext<'_>) -> Result<(), EngineError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn cleanup(&mut self, _bus: &mut EventBus) {}
}

/// Refuses every write.
struct UnavailableStore;

impl SaveStore for UnavailableStore {
    async fn load(&self, _slot: &str) -> Result<Option<SaveFile>, StoreError> {
        Ok(None)
    }

    async fn save(&self, _file: &SaveFile) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(String::from("disk full")))
    }

    async fn delete(&self, _slot: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(Vec::new())
    }
}

fn running(config: SimulationConfig) -> Orchestrator {
    let mut orchestrator = Orchestrator::new(config).unwrap();
    orchestrator.set_phase(GamePhase::Running).unwrap();
    orchestrator
}

fn record_topics(orchestrator: &mut Orchestrator, pattern: &str) -> Arc<Mutex<Vec<&'static str>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    orchestrator.bus_mut().on(pattern, move |event: &GameEvent| {
        sink.lock().unwrap().push(event.topic());
        Ok(())
    });
    seen
}

fn product_by_key(orchestrator: &Orchestrator, key: &str) -> ProductId {
    orchestrator
        .state()
        .market
        .products
        .values()
        .find(|p| p.item_key == key)
        .map(|p| p.id)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Engine isolation
// ---------------------------------------------------------------------------

#[test]
fn failing_engine_does_not_stop_its_siblings() {
    let mut orchestrator = running(SimulationConfig::default());
    let updates = Arc::new(AtomicU64::new(0));
    orchestrator.register_engine(Box::new(BrokenEngine)).unwrap();
    orchestrator
        .register_engine(Box::new(CountingEngine {
            updates: Arc::clone(&updates),
        }))
        .unwrap();

    for tick in 1..=3 {
        let summary = orchestrator.tick(1).unwrap();
        assert_eq!(summary.tick, tick);
        assert_eq!(summary.engine_failures.len(), 1);
        assert_eq!(summary.engine_failures[0].engine, "broken");
    }
    assert_eq!(updates.load(Ordering::SeqCst), 3);
    assert_eq!(
        orchestrator.engine_names(),
        vec!["tenants", "market", "exploration", "broken", "counting"]
    );
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn save_and_load_round_trip() {
    let store = MemoryStore::new();
    let mut original = running(SimulationConfig::default());
    for _ in 0..30 {
        original.tick(1).unwrap();
    }
    let rope = product_by_key(&original, "climbing_rope");
    original.purchase_item(rope, 1).unwrap();
    original.save(&store, "slot1").await.unwrap();

    let mut resumed = Orchestrator::new(SimulationConfig::default()).unwrap();
    let loaded_topics = record_topics(&mut resumed, "game:loaded");
    assert!(!resumed.load(&store, "empty").await.unwrap());
    assert!(resumed.load(&store, "slot1").await.unwrap());

    let mut expected = original.state().clone();
    expected.phase = GamePhase::Paused;
    assert_eq!(resumed.state(), &expected);
    assert_eq!(resumed.state().player.item_count("climbing_rope"), 1);
    assert_eq!(*loaded_topics.lock().unwrap(), vec!["game:loaded"]);

    resumed.set_phase(GamePhase::Running).unwrap();
    let summary = resumed.tick(1).unwrap();
    assert_eq!(summary.tick, 31);
}

#[tokio::test]
async fn in_flight_mission_survives_a_reload() {
    let store = MemoryStore::new();
    let mut original = running(SimulationConfig::default());
    original.tick(1).unwrap();
    let mission = original
        .state()
        .missions_with_status(estate_types::MissionStatus::Available)
        .find(|m| m.requirements.equipment.is_empty() && m.requirements.min_level <= 1)
        .cloned()
        .unwrap();
    original.start_mission(mission.id).unwrap();
    original.save(&store, "mid_mission").await.unwrap();

    let mut resumed = Orchestrator::new(SimulationConfig::default()).unwrap();
    assert!(resumed.load(&store, "mid_mission").await.unwrap());
    // Sweep, autosave, and the pending resolution.
    assert_eq!(resumed.scheduler().len(), 3);

    resumed.set_phase(GamePhase::Running).unwrap();
    let mut resolved = false;
    for _ in 0..mission.duration_hours {
        resolved |= resumed.tick(1).unwrap().resolved_missions.contains(&mission.id);
    }
    assert!(resolved);
}

#[tokio::test]
async fn failed_save_raises_an_urgent_notification() {
    let mut orchestrator = running(SimulationConfig::default());
    let topics = record_topics(&mut orchestrator, "game:*");

    let err = orchestrator.save(&UnavailableStore, "autosave").await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
    assert!(topics.lock().unwrap().contains(&"game:save_failed"));

    let player = orchestrator.state().player.id;
    let inbox = orchestrator.state().notifications.for_player(player);
    let alert = inbox
        .iter()
        .find(|n| n.kind == NotificationType::System)
        .unwrap();
    assert_eq!(alert.priority, NotificationPriority::Urgent);
    assert!(alert.message.contains("disk full"));
}

#[tokio::test]
async fn runner_keeps_going_when_autosave_fails() {
    let mut config = SimulationConfig::default();
    config.game.autosave_interval_ticks = 2;
    let mut orchestrator = Orchestrator::new(config).unwrap();
    let mut source = FixedTickSource::new(6, 1);

    let result = run_simulation(&mut orchestrator, &mut source, &UnavailableStore)
        .await
        .unwrap();

    assert_eq!(result.ticks_run, 6);
    assert_eq!(result.saves, 0);
    assert_eq!(result.save_failures, 3);
    assert_eq!(orchestrator.state().time.tick, 6);
}

// ---------------------------------------------------------------------------
// Long runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn month_long_run_keeps_values_in_bounds() {
    let mut orchestrator = Orchestrator::new(SimulationConfig::default()).unwrap();
    let days = record_topics(&mut orchestrator, "game:day_passed");
    let mut source = FixedTickSource::new(24 * 31, 1);
    let store = MemoryStore::new();

    let result = run_simulation(&mut orchestrator, &mut source, &store)
        .await
        .unwrap();

    assert_eq!(result.engine_failures, 0);
    assert_eq!(result.saves, 31);
    assert_eq!(days.lock().unwrap().len(), 31);

    let state = orchestrator.state();
    assert_eq!(state.time.day(), 31);
    assert!(!state.player.resources.currency.is_sign_negative());
    assert!(
        state
            .tenants
            .values()
            .all(|t| (0.0..=100.0).contains(&t.satisfaction))
    );
    assert!(
        state
            .properties
            .values()
            .all(|p| (0.0..=100.0).contains(&p.condition))
    );
    assert!(state.market.products.values().all(|p| {
        p.current_price >= p.price_floor() && p.current_price <= p.price_ceiling()
    }));
    let progress = state.achievements.progress.values().flat_map(|records| records.values());
    for record in progress {
        assert!((0.0..=1.0).contains(&record.progress));
    }
    assert!(store.list().await.unwrap().contains(&String::from("autosave")));
}
