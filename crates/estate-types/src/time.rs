//! Simulated time.
//!
//! The simulation never reads the wall clock. [`GameTime`] counts elapsed
//! simulated hours from a configured start instant, and every timestamp in
//! the game state (notification creation, achievement completion, mission
//! end times) is derived from it. This keeps runs reproducible for a given
//! seed regardless of how fast the host drives the tick loop.

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Hours in one simulated day.
pub const HOURS_PER_DAY: u64 = 24;

/// Default simulated start instant: 2025-01-01 08:00 UTC.
const DEFAULT_START_UNIX: i64 = 1_735_718_400;

/// Season of the simulated year, derived from the calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// March through May.
    Spring,
    /// June through August.
    Summer,
    /// September through November.
    Autumn,
    /// December through February.
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Self; 4] = [Self::Spring, Self::Summer, Self::Autumn, Self::Winter];

    /// Map a calendar month (1-12) to its season.
    pub const fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }
}

/// Lifecycle phase of the running game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// World is being assembled; ticks are not processed yet.
    Setup,
    /// Ticks advance the simulation.
    Running,
    /// Ticks are accepted but do not advance time.
    Paused,
    /// The session has ended.
    Stopped,
}

/// The simulated clock state persisted with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameTime {
    /// Number of ticks processed so far.
    pub tick: u64,
    /// Simulated hours elapsed since `start`.
    pub elapsed_hours: u64,
    /// Simulated instant at which the game began.
    pub start: DateTime<Utc>,
}

impl Default for GameTime {
    fn default() -> Self {
        Self::starting_at(DateTime::from_timestamp(DEFAULT_START_UNIX, 0).unwrap_or_default())
    }
}

impl GameTime {
    /// Create a clock at tick 0 beginning at `start`.
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            tick: 0,
            elapsed_hours: 0,
            start,
        }
    }

    /// Current simulated instant.
    ///
    /// Saturates at `start` if the elapsed hours cannot be represented.
    pub fn now(&self) -> DateTime<Utc> {
        i64::try_from(self.elapsed_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|delta| self.start.checked_add_signed(delta))
            .unwrap_or(self.start)
    }

    /// Zero-based simulated day counter.
    pub const fn day(&self) -> u64 {
        self.elapsed_hours / HOURS_PER_DAY
    }

    /// Hour of day (0-23) of the current simulated instant.
    pub fn hour_of_day(&self) -> u32 {
        self.now().hour()
    }

    /// Season of the current simulated instant.
    pub fn season(&self) -> Season {
        Season::from_month(self.now().month())
    }
}
