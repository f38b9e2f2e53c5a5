use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note::NOTE_COUNT;

/// Difficulty tier. The numeric value is both the size of the note pool
/// and the length of the first sequence in a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid difficulty {0}: expected one of 3, 6, 8, 12")]
pub struct ParseDifficultyError(pub String);

impl Difficulty {
    /// All tiers, lowest first.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Numeric tier value (3, 6, 8 or 12).
    pub fn value(self) -> u8 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 6,
            Difficulty::Hard => 8,
            Difficulty::Expert => 12,
        }
    }

    pub fn from_value(value: u8) -> Option<Difficulty> {
        Self::ALL.into_iter().find(|d| d.value() == value)
    }

    /// Number of notes, from the front of the alphabet, eligible at this tier.
    pub fn pool_size(self) -> usize {
        let size = self.value() as usize;
        debug_assert!(size <= NOTE_COUNT);
        size
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.value())
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ParseDifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Difficulty::from_value(value).ok_or_else(|| ParseDifficultyError(value.to_string()))
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.value()
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    /// Accepts the numeric value or the label (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<u8>() {
            return Difficulty::try_from(value);
        }
        Difficulty::ALL
            .into_iter()
            .find(|d| d.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseDifficultyError(s.to_string()))
    }
}
