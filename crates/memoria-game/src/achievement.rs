//! Fixed-threshold achievement rules.

use std::collections::BTreeSet;

use memoria_types::achievement::LEVEL_COMPLETE_LENGTH;
use memoria_types::{Achievement, AchievementId, Difficulty};

/// Snapshot of the session taken when a round completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Successful rounds in a row this session (the score).
    pub consecutive_successes: u32,
    pub difficulty: Difficulty,
    /// Length of the sequence that was just completed.
    pub sequence_length: usize,
}

/// Every achievement whose rule `progress` satisfies.
pub fn evaluate(progress: &Progress) -> BTreeSet<AchievementId> {
    let mut ids = BTreeSet::new();
    for id in [
        AchievementId::FirstSequence,
        AchievementId::SequenceMaster10,
        AchievementId::SequenceMaster20,
    ] {
        if progress.consecutive_successes >= id.requirement() {
            ids.insert(id);
        }
    }
    if progress.sequence_length >= LEVEL_COMPLETE_LENGTH {
        ids.insert(AchievementId::LevelComplete(progress.difficulty));
    }
    ids
}

/// The satisfied achievements not yet unlocked in `current`.
pub fn newly_satisfied(progress: &Progress, current: &[Achievement]) -> BTreeSet<AchievementId> {
    evaluate(progress)
        .into_iter()
        .filter(|id| !current.iter().any(|a| a.id == *id && a.unlocked))
        .collect()
}

/// Unlock tally for the achievements screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementSummary {
    pub unlocked: usize,
    pub total: usize,
}

impl AchievementSummary {
    pub fn of(achievements: &[Achievement]) -> Self {
        Self {
            unlocked: achievements.iter().filter(|a| a.unlocked).count(),
            total: achievements.len(),
        }
    }

    /// Percentage unlocked, 0.0 for an empty list.
    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.unlocked as f64 / self.total as f64 * 100.0
    }
}
