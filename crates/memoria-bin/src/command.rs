//! Line commands typed at the prompt.

use memoria_types::{Difficulty, Note, ParseDifficultyError, ParseNoteError};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  level <3|6|8|12>   choose the difficulty (between games)
  start              start a new game and play the first sequence
  play               play the opening sequence of a started game
  <notes>            enter notes, e.g. `C4 D4 C#4`
  reset              abandon the current game
  stats              show score, lives and records
  achievements       list achievements
  help               show this text
  quit               exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Level(Difficulty),
    Start,
    Play,
    Notes(Vec<Note>),
    Reset,
    Stats,
    Achievements,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("usage: level <3|6|8|12>")]
    MissingLevel,

    #[error(transparent)]
    Difficulty(#[from] ParseDifficultyError),

    #[error("unknown command or note: {0}")]
    Unknown(String),
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(None);
        };
        let command = match first.to_ascii_lowercase().as_str() {
            "level" | "l" => {
                let value = words.next().ok_or(CommandError::MissingLevel)?;
                Command::Level(value.parse()?)
            }
            "start" | "s" => Command::Start,
            "play" | "p" => Command::Play,
            "reset" | "r" => Command::Reset,
            "stats" => Command::Stats,
            "achievements" => Command::Achievements,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => {
                let notes = line
                    .split_whitespace()
                    .map(str::parse)
                    .collect::<Result<Vec<Note>, _>>()
                    .map_err(|ParseNoteError(word)| CommandError::Unknown(word))?;
                Command::Notes(notes)
            }
        };
        Ok(Some(command))
    }
}
