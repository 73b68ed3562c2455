//! Validation failures returned by player-facing operations.
//!
//! Starting a mission without enough energy or buying an out-of-stock item
//! is an expected outcome, not a fault. Such operations return
//! `Result<T, Rejection>` and leave the game state untouched when they fail.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The referenced entity does not exist.
    NotFound,
    /// The player's level is below the requirement.
    InsufficientLevel,
    /// Not enough currency.
    InsufficientFunds,
    /// Not enough energy.
    InsufficientEnergy,
    /// Required equipment is missing from the inventory.
    MissingEquipment,
    /// The entity is in the wrong state for this operation.
    InvalidState,
    /// The target is at capacity.
    CapacityFull,
    /// The mission has not reached its estimated end time.
    NotFinished,
    /// Not enough stock.
    OutOfStock,
    /// An argument is out of range.
    InvalidInput,
}

/// A refused operation with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[error("{message}")]
pub struct Rejection {
    /// Machine-readable reason.
    pub reason: RejectionReason,
    /// Explanation suitable for display.
    pub message: String,
}

impl Rejection {
    /// Build a rejection.
    pub fn new(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    /// Shorthand for [`RejectionReason::NotFound`].
    pub fn not_found(what: impl core::fmt::Display) -> Self {
        Self::new(RejectionReason::NotFound, format!("{what} not found"))
    }
}
