//! Simulated game clock.
//!
//! The clock turns "advance by N hours" into a [`TickDelta`] that every
//! engine receives. The persisted [`GameTime`] is the single source of truth;
//! the clock itself only carries the tick length, so a loaded save continues
//! exactly where it left off.
//!
//! All arithmetic is checked. A tick that would overflow the tick counter or
//! push the simulated instant out of range is refused without touching the
//! time.

use chrono::TimeDelta;
use estate_engines::TickDelta;
use estate_types::GameTime;
use estate_types::time::HOURS_PER_DAY;

use crate::config::GameConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// The simulated instant would leave the representable date range.
    #[error("simulated time out of range after {elapsed_hours} hours")]
    TimeOutOfRange {
        /// Elapsed hours that could not be represented.
        elapsed_hours: u64,
    },

    /// Invalid time configuration (e.g. zero hours per tick).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Converts ticks into simulated hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameClock {
    hours_per_tick: u64,
}

impl GameClock {
    /// Create a clock from the game configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `hours_per_tick` is 0.
    pub fn new(config: &GameConfig) -> Result<Self, ClockError> {
        Self::with_hours_per_tick(config.hours_per_tick)
    }

    /// Create a clock with an explicit tick length.
    pub fn with_hours_per_tick(hours_per_tick: u64) -> Result<Self, ClockError> {
        if hours_per_tick == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "hours_per_tick must be at least 1".to_owned(),
            });
        }
        Ok(Self { hours_per_tick })
    }

    /// Simulated hours in one regular tick.
    pub const fn hours_per_tick(&self) -> u64 {
        self.hours_per_tick
    }

    /// Ticks needed to cover `hours`, rounded up.
    pub const fn ticks_for_hours(&self, hours: u64) -> u64 {
        hours.div_ceil(self.hours_per_tick)
    }

    /// Advance `time` by one tick covering `hours` simulated hours.
    ///
    /// A zero-hour tick still increments the tick counter but leaves the
    /// simulated instant unchanged.
    pub fn advance(&self, time: &mut GameTime, hours: u64) -> Result<TickDelta, ClockError> {
        let tick = time.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed_hours = time
            .elapsed_hours
            .checked_add(hours)
            .ok_or(ClockError::TimeOutOfRange {
                elapsed_hours: u64::MAX,
            })?;
        let representable = i64::try_from(elapsed_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|delta| time.start.checked_add_signed(delta))
            .is_some();
        if !representable {
            return Err(ClockError::TimeOutOfRange { elapsed_hours });
        }

        let previous_day = time.day();
        time.tick = tick;
        time.elapsed_hours = elapsed_hours;

        let elapsed_days = hours as f64 / HOURS_PER_DAY as f64;
        Ok(TickDelta {
            tick,
            elapsed_hours: hours,
            elapsed_days,
            previous_day,
            day: time.day(),
            now: time.now(),
        })
    }
}
