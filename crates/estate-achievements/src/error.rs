//! Error types for the `estate-achievements` crate.

use estate_types::AchievementId;

/// Misuse of the achievement API.
///
/// These signal caller bugs (an id that was never registered, a malformed
/// definition), not gameplay outcomes; a claim that cannot be honored yet
/// is a [`crate::ClaimOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum AchievementError {
    /// An achievement with this id is already registered.
    #[error("duplicate achievement: {0}")]
    DuplicateAchievement(AchievementId),

    /// No achievement with this id is registered.
    #[error("unknown achievement: {0}")]
    UnknownAchievement(AchievementId),

    /// The definition cannot be tracked.
    #[error("invalid achievement definition {id}: {reason}")]
    InvalidDefinition {
        /// Offending achievement.
        id: AchievementId,
        /// What is wrong with it.
        reason: String,
    },
}
