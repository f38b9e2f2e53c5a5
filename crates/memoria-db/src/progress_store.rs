//! Narrow accessors over the persisted record.
//!
//! Every operation is a fresh load-modify-save round trip, so callers never
//! hold the record between operations. Reads that fail fall back to the
//! default record; writes report the failure to the caller.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::warn;
use memoria_types::{Achievement, AchievementId, Difficulty};

use crate::PersistenceGateway;
use crate::record::PersistedRecord;

/// Result of an unlock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Newly unlocked at the given time.
    Unlocked(DateTime<Utc>),
    /// Was already unlocked; nothing was written.
    AlreadyUnlocked,
}

pub struct ProgressStore<G> {
    gateway: G,
}

impl<G: PersistenceGateway> ProgressStore<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Loads the record, normalized against the achievement catalog.
    /// Absent or unreadable data yields the default record.
    pub fn record(&mut self) -> PersistedRecord {
        match self.gateway.load() {
            Ok(Some(mut record)) => {
                record.normalize();
                record
            }
            Ok(None) => PersistedRecord::default(),
            Err(e) => {
                warn!("Failed to load progress, using defaults: {e:#}");
                PersistedRecord::default()
            }
        }
    }

    pub fn high_score(&mut self) -> u32 {
        self.record().high_score
    }

    pub fn games_played(&mut self) -> u32 {
        self.record().total_games_played
    }

    pub fn last_played_difficulty(&mut self) -> Difficulty {
        self.record().last_played_difficulty
    }

    pub fn achievements(&mut self) -> Vec<Achievement> {
        self.record().achievements
    }

    /// Raises the high score to `score` if it is higher.
    /// Returns the stored high score after the update.
    pub fn update_high_score(&mut self, score: u32) -> Result<u32> {
        let mut record = self.record();
        if score <= record.high_score {
            return Ok(record.high_score);
        }
        record.high_score = score;
        self.gateway.save(&record)?;
        Ok(record.high_score)
    }

    /// Returns the new total.
    pub fn increment_games_played(&mut self) -> Result<u32> {
        let mut record = self.record();
        record.total_games_played = record.total_games_played.saturating_add(1);
        self.gateway.save(&record)?;
        Ok(record.total_games_played)
    }

    pub fn set_last_played_difficulty(&mut self, difficulty: Difficulty) -> Result<()> {
        let mut record = self.record();
        if record.last_played_difficulty == difficulty {
            return Ok(());
        }
        record.last_played_difficulty = difficulty;
        self.gateway.save(&record)
    }

    /// Unlocks `id` now.
    pub fn unlock(&mut self, id: AchievementId) -> Result<UnlockOutcome> {
        self.unlock_at(id, Utc::now())
    }

    /// Unlocks `id` with the given timestamp. A no-op if already unlocked.
    pub fn unlock_at(&mut self, id: AchievementId, at: DateTime<Utc>) -> Result<UnlockOutcome> {
        let mut record = self.record();
        let newly = match record.achievement_mut(id) {
            Some(achievement) => achievement.unlock(at),
            None => false,
        };
        if !newly {
            return Ok(UnlockOutcome::AlreadyUnlocked);
        }
        self.gateway.save(&record)?;
        Ok(UnlockOutcome::Unlocked(at))
    }
}
