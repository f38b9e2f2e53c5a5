// The game core: sequence generation and validation, achievement rules,
// delayed-event scheduling and the session state machine.

pub mod achievement;
pub mod scheduler;
pub mod sequence;
pub mod session;

pub use achievement::{AchievementSummary, Progress};
pub use scheduler::{RoundId, Scheduled, Scheduler};
pub use sequence::{RandomSource, RngSource, ScriptedSource, SequenceError};
pub use session::{GameSession, NoteOutcome, Phase, SessionState};
