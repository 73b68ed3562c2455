//! Simulation engines for the Estate simulation engine.
//!
//! # Modules
//!
//! - [`engine`] -- The [`SubEngine`] contract, tick context, and inboxes
//! - [`rng`] -- Injectable randomness ([`SimRng`], [`ScriptedRng`])
//! - [`config`] -- Per-engine tuning loaded from the game config file
//! - [`error`] -- [`EngineError`]
//! - [`tenant`] -- Satisfaction, rent, wear, complaints, interactions
//! - [`market`] -- Prices, indices, market events and trends, purchases
//! - [`exploration`] -- Mission generation and the mission lifecycle

pub mod config;
pub mod engine;
pub mod error;
pub mod exploration;
pub mod market;
pub mod rng;
pub mod tenant;

pub use config::{ExplorationConfig, MarketConfig, SatisfactionWeights, TenantConfig};
pub use engine::{Inbox, SubEngine, TickContext, TickDelta};
pub use error::EngineError;
pub use exploration::ExplorationEngine;
pub use market::MarketEngine;
pub use rng::{ScriptedRng, SimRng};
pub use tenant::TenantEngine;
