//! Headless runner for the Estate simulation.
//!
//! Loads the configuration, optionally resumes the autosave, and runs the
//! tick loop with autosave until the configured tick budget is spent or
//! the process is interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (path from the first argument, default
//!    `estate-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the orchestrator: starter world or empty game
//! 4. Resume from the autosave slot if `persistence.resume` is set
//! 5. Run the tick loop
//! 6. Write a final save and log the result

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use estate_core::Orchestrator;
use estate_core::config::{LoggingConfig, SimulationConfig};
use estate_core::runner::{self, FixedTickSource, IntervalTickSource, RunnerError, SimulationResult};
use estate_store::FileStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::SimError;

/// Config file used when no path is given.
const DEFAULT_CONFIG_PATH: &str = "estate-config.yaml";

/// Application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        config = %config_path.display(),
        from_file,
        seed = config.game.seed,
        hours_per_tick = config.game.hours_per_tick,
        max_ticks = config.simulation.max_ticks,
        tick_interval_ms = config.simulation.tick_interval_ms,
        "estate-sim starting"
    );

    // 3. Build the orchestrator.
    let store = FileStore::new(&config.persistence.save_dir);
    let slot = config.persistence.autosave_slot.clone();
    let resume = config.persistence.resume;
    let mut orchestrator = Orchestrator::new(config).map_err(SimError::from)?;

    // 4. Resume.
    if resume {
        if orchestrator.load(&store, &slot).await.map_err(SimError::from)? {
            info!(%slot, tick = orchestrator.state().time.tick, "Resumed from autosave");
        } else {
            info!(%slot, "No autosave found, starting a new game");
        }
    }

    // 5. Run until the budget is spent or the process is interrupted.
    let outcome = tokio::select! {
        result = run(&mut orchestrator, &store) => Some(result.map_err(SimError::from)?),
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            None
        }
    };

    // 6. Final save and results.
    if let Err(error) = orchestrator.save(&store, &slot).await {
        warn!(%slot, %error, "Final save failed");
    }
    orchestrator.shutdown();
    if let Some(result) = outcome.as_ref() {
        runner::log_simulation_end(result);
    }

    info!(
        tick = orchestrator.state().time.tick,
        day = orchestrator.state().time.day(),
        currency = %orchestrator.state().player.resources.currency,
        level = orchestrator.state().player.level,
        "estate-sim shutdown complete"
    );
    Ok(())
}

/// Drive the orchestrator with the tick source the config asks for.
async fn run(orchestrator: &mut Orchestrator, store: &FileStore) -> Result<SimulationResult, RunnerError> {
    let hours = orchestrator.config().game.hours_per_tick;
    let pacing = orchestrator.config().simulation.clone();
    let limit = (pacing.max_ticks > 0).then_some(pacing.max_ticks);

    if pacing.tick_interval_ms == 0 {
        let mut source = FixedTickSource::new(limit.unwrap_or(u64::MAX), hours);
        runner::run_simulation(orchestrator, &mut source, store).await
    } else {
        let period = Duration::from_millis(pacing.tick_interval_ms);
        let mut source = IntervalTickSource::new(period, hours, limit);
        runner::run_simulation(orchestrator, &mut source, store).await
    }
}

/// Load the configuration at `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), SimError> {
    if path.exists() {
        Ok((SimulationConfig::from_file(path)?, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), SimError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| SimError::LogFilter {
            directive: logging.level.clone(),
            message: e.to_string(),
        })?,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    Ok(())
}
