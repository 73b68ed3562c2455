//! Game clock, orchestration, and the tick loop for the Estate simulation.
//!
//! This crate wires the engines together. The [`Orchestrator`] owns the
//! game state and runs the five-phase tick: Clock, Scheduler, Engines,
//! Reaction, and Level.
//!
//! # Modules
//!
//! - [`clock`] -- [`GameClock`]: checked advancement of simulated time.
//! - [`config`] -- Configuration loading from `estate-config.yaml` into
//!   strongly-typed structs.
//! - [`orchestrator`] -- [`Orchestrator`]: engine registry, tick cycle,
//!   reaction stage, save and load.
//! - [`commands`] -- Player-facing operations on the orchestrator.
//! - [`runner`] -- [`run_simulation`], the [`TickSource`] trait, and its
//!   fixed and interval implementations.
//! - [`seed`] -- New games and the starter world.
//!
//! [`GameClock`]: clock::GameClock
//! [`Orchestrator`]: orchestrator::Orchestrator
//! [`run_simulation`]: runner::run_simulation
//! [`TickSource`]: runner::TickSource

pub mod clock;
pub mod commands;
pub mod config;
pub mod orchestrator;
pub mod runner;
pub mod seed;

pub use config::SimulationConfig;
pub use orchestrator::{Orchestrator, OrchestratorError, TickSummary};
pub use runner::{
    FixedTickSource, IntervalTickSource, RunnerError, SimulationResult, TickSource, run_simulation,
};
