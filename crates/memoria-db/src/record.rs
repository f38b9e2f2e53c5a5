use memoria_types::{Achievement, AchievementId, Difficulty};
use serde::{Deserialize, Serialize};

/// Everything that outlives a single session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedRecord {
    /// Best score across all sessions ever played.
    pub high_score: u32,
    pub total_games_played: u32,
    pub last_played_difficulty: Difficulty,
    pub achievements: Vec<Achievement>,
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_games_played: 0,
            last_played_difficulty: Difficulty::default(),
            achievements: Achievement::catalog(),
        }
    }
}

impl PersistedRecord {
    /// Brings a stored achievement list in line with the catalog: every
    /// catalog entry present exactly once, in catalog order, with unlock
    /// state carried over from the stored entry.
    pub fn normalize(&mut self) {
        let stored = std::mem::take(&mut self.achievements);
        self.achievements = AchievementId::all()
            .into_iter()
            .map(|id| {
                let mut entry = Achievement::locked(id);
                if let Some(prev) = stored.iter().find(|a| a.id == id && a.unlocked) {
                    entry.unlocked = true;
                    entry.unlocked_at = prev.unlocked_at;
                }
                entry
            })
            .collect();
    }

    pub fn achievement(&self, id: AchievementId) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn achievement_mut(&mut self, id: AchievementId) -> Option<&mut Achievement> {
        self.achievements.iter_mut().find(|a| a.id == id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.unlocked).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn default_record() {
        let r = PersistedRecord::default();
        assert_eq!(r.high_score, 0);
        assert_eq!(r.total_games_played, 0);
        assert_eq!(r.last_played_difficulty, Difficulty::Easy);
        assert_eq!(r.achievements.len(), 7);
        assert_eq!(r.unlocked_count(), 0);
    }

    #[test]
    fn normalize_fills_missing_and_keeps_unlocks() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let mut unlocked = Achievement::locked(AchievementId::SequenceMaster10);
        unlocked.unlock(at);

        let mut r = PersistedRecord {
            achievements: vec![unlocked, Achievement::locked(AchievementId::SequenceMaster10)],
            ..PersistedRecord::default()
        };
        r.normalize();

        assert_eq!(r.achievements.len(), 7);
        let a = r.achievement(AchievementId::SequenceMaster10).unwrap();
        assert!(a.unlocked);
        assert_eq!(a.unlocked_at, Some(at));
        assert_eq!(r.unlocked_count(), 1);
        assert_eq!(r.achievements[0].id, AchievementId::FirstSequence);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let r: PersistedRecord = serde_json::from_str(r#"{"high_score": 9}"#).unwrap();
        assert_eq!(r.high_score, 9);
        assert_eq!(r.total_games_played, 0);
        assert_eq!(r.achievements.len(), 7);
    }
}
