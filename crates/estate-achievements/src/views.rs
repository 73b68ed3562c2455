//! Read-only views over the achievement book for the presentation layer.

use std::collections::BTreeMap;

use estate_types::{
    AchievementBook, AchievementDefinition, AchievementProgress, AchievementStatus,
    AchievementTier, PlayerId,
};
use serde::Serialize;

/// One achievement as the player sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AchievementView {
    /// The definition.
    pub definition: AchievementDefinition,
    /// The player's progress (locked and empty if never touched).
    pub progress: AchievementProgress,
}

/// Summary counts for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AchievementStats {
    /// Registered achievements.
    pub total: usize,
    /// Completed, including claimed.
    pub completed: usize,
    /// Claimed.
    pub claimed: usize,
    /// Started but not completed.
    pub in_progress: usize,
    /// `completed / total` as a percentage.
    pub completion_percent: f64,
    /// Completed achievements per tier.
    pub by_tier: BTreeMap<AchievementTier, usize>,
}

const fn is_done(status: AchievementStatus) -> bool {
    matches!(status, AchievementStatus::Completed | AchievementStatus::Claimed)
}

/// Every achievement with the player's progress, in id order.
///
/// Hidden achievements are left out until completed unless
/// `include_hidden` is set.
pub fn player_achievements(
    book: &AchievementBook,
    player: PlayerId,
    include_hidden: bool,
) -> Vec<AchievementView> {
    let records = book.progress.get(&player);
    book.definitions
        .values()
        .map(|definition| AchievementView {
            definition: definition.clone(),
            progress: records
                .and_then(|r| r.get(&definition.id))
                .cloned()
                .unwrap_or_else(|| AchievementProgress::for_definition(definition)),
        })
        .filter(|view| include_hidden || !view.definition.hidden || is_done(view.progress.status))
        .collect()
}

/// Completion statistics for `player`.
pub fn stats(book: &AchievementBook, player: PlayerId) -> AchievementStats {
    let mut stats = AchievementStats {
        total: book.definitions.len(),
        ..AchievementStats::default()
    };
    let Some(records) = book.progress.get(&player) else {
        return stats;
    };
    for (id, record) in records {
        match record.status {
            AchievementStatus::Locked => {}
            AchievementStatus::InProgress => stats.in_progress = stats.in_progress.saturating_add(1),
            AchievementStatus::Completed | AchievementStatus::Claimed => {
                stats.completed = stats.completed.saturating_add(1);
                if record.status == AchievementStatus::Claimed {
                    stats.claimed = stats.claimed.saturating_add(1);
                }
                if let Some(definition) = book.definitions.get(id) {
                    let count = stats.by_tier.entry(definition.tier).or_insert(0);
                    *count = count.saturating_add(1);
                }
            }
        }
    }
    if stats.total > 0 {
        stats.completion_percent = stats.completed as f64 / stats.total as f64 * 100.0;
    }
    stats
}
