use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::difficulty::Difficulty;

/// Sequence length that completes a difficulty tier.
pub const LEVEL_COMPLETE_LENGTH: usize = 15;

/// Stable achievement identity. Serialized as its string id
/// (`first_sequence`, `level_complete_8`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AchievementId {
    FirstSequence,
    SequenceMaster10,
    SequenceMaster20,
    LevelComplete(Difficulty),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown achievement id: {0:?}")]
pub struct ParseAchievementIdError(pub String);

impl AchievementId {
    /// Every achievement in catalog order.
    pub fn all() -> [AchievementId; 7] {
        [
            AchievementId::FirstSequence,
            AchievementId::SequenceMaster10,
            AchievementId::SequenceMaster20,
            AchievementId::LevelComplete(Difficulty::Easy),
            AchievementId::LevelComplete(Difficulty::Medium),
            AchievementId::LevelComplete(Difficulty::Hard),
            AchievementId::LevelComplete(Difficulty::Expert),
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstSequence => "first_sequence",
            AchievementId::SequenceMaster10 => "sequence_master_10",
            AchievementId::SequenceMaster20 => "sequence_master_20",
            AchievementId::LevelComplete(Difficulty::Easy) => "level_complete_3",
            AchievementId::LevelComplete(Difficulty::Medium) => "level_complete_6",
            AchievementId::LevelComplete(Difficulty::Hard) => "level_complete_8",
            AchievementId::LevelComplete(Difficulty::Expert) => "level_complete_12",
        }
    }

    /// Threshold the rule compares against: consecutive successes for the
    /// streak achievements, sequence length for the tier achievements.
    pub fn requirement(self) -> u32 {
        match self {
            AchievementId::FirstSequence => 1,
            AchievementId::SequenceMaster10 => 10,
            AchievementId::SequenceMaster20 => 20,
            AchievementId::LevelComplete(_) => LEVEL_COMPLETE_LENGTH as u32,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AchievementId::FirstSequence => "First Success",
            AchievementId::SequenceMaster10 => "Sequence Master",
            AchievementId::SequenceMaster20 => "Sequence Expert",
            AchievementId::LevelComplete(Difficulty::Easy) => "Easy Champion",
            AchievementId::LevelComplete(Difficulty::Medium) => "Medium Champion",
            AchievementId::LevelComplete(Difficulty::Hard) => "Hard Champion",
            AchievementId::LevelComplete(Difficulty::Expert) => "Expert Champion",
        }
    }

    pub fn description(self) -> String {
        match self {
            AchievementId::FirstSequence => "Complete your first sequence".to_string(),
            AchievementId::SequenceMaster10 => "Complete 10 sequences in a row".to_string(),
            AchievementId::SequenceMaster20 => "Complete 20 sequences in a row".to_string(),
            AchievementId::LevelComplete(d) => format!(
                "Reach sequence length {} on {} mode",
                LEVEL_COMPLETE_LENGTH,
                d.label()
            ),
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementId {
    type Err = ParseAchievementIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AchievementId::all()
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParseAchievementIdError(s.to_string()))
    }
}

impl TryFrom<String> for AchievementId {
    type Error = ParseAchievementIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AchievementId> for String {
    fn from(id: AchievementId) -> Self {
        id.as_str().to_string()
    }
}

/// An achievement together with its unlock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub requirement: u32,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    /// A locked achievement with catalog text.
    pub fn locked(id: AchievementId) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            description: id.description(),
            requirement: id.requirement(),
            unlocked: false,
            unlocked_at: None,
        }
    }

    /// The full catalog, all locked.
    pub fn catalog() -> Vec<Achievement> {
        AchievementId::all()
            .into_iter()
            .map(Achievement::locked)
            .collect()
    }

    /// Marks the achievement unlocked at `at`.
    /// Returns false (and leaves the timestamp alone) if it already was.
    pub fn unlock(&mut self, at: DateTime<Utc>) -> bool {
        if self.unlocked {
            return false;
        }
        self.unlocked = true;
        self.unlocked_at = Some(at);
        true
    }
}
