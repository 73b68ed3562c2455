//! Clamping helpers for bounded scalars.
//!
//! Satisfaction, condition, and progress percentages live in `[0, 100]`,
//! relationship strengths in `[-100, 100]`. Every write goes through these
//! helpers so NaN or out-of-range arithmetic never leaks into state.

/// Lower bound of a percentage.
pub const PERCENT_MIN: f64 = 0.0;

/// Upper bound of a percentage.
pub const PERCENT_MAX: f64 = 100.0;

/// Bound (absolute) of a relationship strength.
pub const STRENGTH_LIMIT: i32 = 100;

/// Clamp a value into `[0, 100]`. NaN maps to 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        PERCENT_MIN
    } else {
        value.clamp(PERCENT_MIN, PERCENT_MAX)
    }
}

/// Clamp a value into `[0, 1]`. NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a relationship strength into `[-100, 100]`.
pub fn clamp_strength(value: i32) -> i32 {
    value.clamp(-STRENGTH_LIMIT, STRENGTH_LIMIT)
}
