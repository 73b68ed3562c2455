//! Achievements for the Estate simulation engine.
//!
//! Definitions and per-player progress live in
//! [`estate_types::AchievementBook`] inside the game state, so they are
//! saved and loaded with everything else. This crate holds the logic.
//!
//! - [`engine`] -- [`AchievementEngine`]: registration, progress, claims,
//!   and the mapping from game events to tracked conditions
//! - [`views`] -- Player-facing listings and statistics
//! - [`catalog`] -- The built-in achievement set
//! - [`error`] -- [`AchievementError`]

pub mod catalog;
pub mod engine;
pub mod error;
pub mod views;

pub use catalog::default_catalog;
pub use engine::{AchievementEngine, ClaimOutcome, WorldSnapshot};
pub use error::AchievementError;
pub use views::{AchievementStats, AchievementView, player_achievements, stats};
