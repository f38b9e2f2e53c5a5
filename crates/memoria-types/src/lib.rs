// Shared value types: notes, difficulty tiers, sequences, achievements,
// game configuration and the clocks that drive a session.

pub mod achievement;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod note;
pub mod sequence;

pub use achievement::{Achievement, AchievementId, ParseAchievementIdError};
pub use clock::{GameClock, SteppedClock, WallClock};
pub use config::{GameConfig, TimingConfig};
pub use difficulty::{Difficulty, ParseDifficultyError};
pub use note::{NOTE_COUNT, Note, ParseNoteError};
pub use sequence::Sequence;
