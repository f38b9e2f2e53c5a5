use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::note::Note;

/// A non-empty ordered list of notes the player must reproduce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Note>", into = "Vec<Note>")]
pub struct Sequence(Vec<Note>);

impl Sequence {
    /// Returns `None` for an empty list.
    pub fn new(notes: Vec<Note>) -> Option<Self> {
        if notes.is_empty() {
            None
        } else {
            Some(Self(notes))
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.0
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.0
    }
}

impl Deref for Sequence {
    type Target = [Note];

    fn deref(&self) -> &[Note] {
        &self.0
    }
}

impl TryFrom<Vec<Note>> for Sequence {
    type Error = &'static str;

    fn try_from(notes: Vec<Note>) -> Result<Self, Self::Error> {
        Sequence::new(notes).ok_or("sequence must contain at least one note")
    }
}

impl From<Sequence> for Vec<Note> {
    fn from(seq: Sequence) -> Self {
        seq.0
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, note) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{note}")?;
        }
        Ok(())
    }
}
