//! Tick loop runner.
//!
//! [`run_simulation`] drives an [`Orchestrator`] from a [`TickSource`] and
//! performs the autosaves the orchestrator flags. It is the only place the
//! simulation awaits anything: the tick source between ticks, and the save
//! store after a tick that asked for an autosave.
//!
//! - [`FixedTickSource`] runs a fixed number of ticks back to back
//! - [`IntervalTickSource`] paces ticks in real time with a tokio interval

use std::future::Future;
use std::time::Duration;

use estate_store::SaveStore;
use estate_types::{GamePhase, Rejection};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::orchestrator::{Orchestrator, OrchestratorError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick could not be executed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying orchestrator error.
        #[from]
        source: OrchestratorError,
    },

    /// The game could not be moved to running.
    #[error("cannot start the simulation: {source}")]
    Phase {
        /// The rejected phase change.
        #[from]
        source: Rejection,
    },
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// The tick source has no more ticks.
    SourceExhausted,
    /// The game left the running phase.
    GameHalted,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick ran.
    pub final_summary: Option<TickSummary>,
    /// Ticks executed by this run.
    pub ticks_run: u64,
    /// Sub-engine updates that failed across the run.
    pub engine_failures: u64,
    /// Autosaves written.
    pub saves: u64,
    /// Autosaves that failed.
    pub save_failures: u64,
}

/// Supplies ticks to the runner.
pub trait TickSource: Send {
    /// Wait for the next tick and return the simulated hours it covers,
    /// or `None` when the source is exhausted.
    fn next_tick(&mut self) -> impl Future<Output = Option<u64>> + Send;
}

/// A fixed number of ticks with no delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTickSource {
    remaining: u64,
    hours: u64,
}

impl FixedTickSource {
    /// `count` ticks of `hours` simulated hours each.
    pub const fn new(count: u64, hours: u64) -> Self {
        Self {
            remaining: count,
            hours,
        }
    }

    /// Ticks not yet handed out.
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl TickSource for FixedTickSource {
    async fn next_tick(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        Some(self.hours)
    }
}

/// Real-time pacing: one tick per `period`, optionally bounded.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct IntervalTickSource {
    interval: Interval,
    hours: u64,
    remaining: Option<u64>,
}

impl IntervalTickSource {
    /// One tick of `hours` every `period`; `limit` of `None` runs forever.
    ///
    /// A zero period is raised to one millisecond. Missed ticks are skipped
    /// rather than replayed in a burst.
    pub fn new(period: Duration, hours: u64, limit: Option<u64>) -> Self {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            hours,
            remaining: limit,
        }
    }
}

impl TickSource for IntervalTickSource {
    async fn next_tick(&mut self) -> Option<u64> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining = remaining.saturating_sub(1);
        }
        self.interval.tick().await;
        Some(self.hours)
    }
}

/// Run the tick loop until the source is exhausted or the game halts.
///
/// The game is moved to [`GamePhase::Running`] first. After each tick that
/// flags an autosave, the state is written to the configured autosave slot;
/// a failed save is logged and the loop continues.
pub async fn run_simulation<T, S>(
    orchestrator: &mut Orchestrator,
    source: &mut T,
    store: &S,
) -> Result<SimulationResult, RunnerError>
where
    T: TickSource,
    S: SaveStore,
{
    orchestrator.set_phase(GamePhase::Running)?;
    let slot = orchestrator.config().persistence.autosave_slot.clone();

    let mut result = SimulationResult {
        end_reason: SimulationEndReason::SourceExhausted,
        final_summary: None,
        ticks_run: 0,
        engine_failures: 0,
        saves: 0,
        save_failures: 0,
    };

    info!(
        tick = orchestrator.state().time.tick,
        engines = ?orchestrator.engine_names(),
        autosave_slot = %slot,
        "Simulation starting"
    );

    while let Some(hours) = source.next_tick().await {
        if orchestrator.state().phase != GamePhase::Running {
            info!(phase = ?orchestrator.state().phase, "Game left the running phase");
            result.end_reason = SimulationEndReason::GameHalted;
            break;
        }

        let summary = orchestrator.tick(hours)?;
        result.ticks_run = result.ticks_run.saturating_add(1);
        let failures = u64::try_from(summary.engine_failures.len()).unwrap_or(u64::MAX);
        result.engine_failures = result.engine_failures.saturating_add(failures);

        if summary.autosave_due {
            match orchestrator.save(store, &slot).await {
                Ok(()) => result.saves = result.saves.saturating_add(1),
                Err(error) => {
                    warn!(tick = summary.tick, %slot, %error, "Autosave failed");
                    result.save_failures = result.save_failures.saturating_add(1);
                }
            }
        }

        result.final_summary = Some(summary);
    }

    Ok(result)
}

/// Log the outcome of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        ticks_run = result.ticks_run,
        engine_failures = result.engine_failures,
        saves = result.saves,
        save_failures = result.save_failures,
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(tick = summary.tick, day = summary.day, "Final tick summary");
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
