use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of keys on the simulated keyboard (one chromatic octave).
pub const NOTE_COUNT: usize = 12;

/// A pitch on the simulated keyboard, C4 through B4.
///
/// The declaration order is the fixed note alphabet: difficulty tiers draw
/// from a prefix of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Note {
    C4,
    Cs4,
    D4,
    Ds4,
    E4,
    F4,
    Fs4,
    G4,
    Gs4,
    A4,
    As4,
    B4,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown note symbol: {0:?}")]
pub struct ParseNoteError(pub String);

impl Note {
    /// Returns the full alphabet in order.
    pub fn all() -> &'static [Note; NOTE_COUNT] {
        &[
            Note::C4,
            Note::Cs4,
            Note::D4,
            Note::Ds4,
            Note::E4,
            Note::F4,
            Note::Fs4,
            Note::G4,
            Note::Gs4,
            Note::A4,
            Note::As4,
            Note::B4,
        ]
    }

    /// Returns the position in the alphabet (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Create a note from a 0-based alphabet position.
    pub fn from_index(index: usize) -> Option<Note> {
        Self::all().get(index).copied()
    }

    /// Scientific pitch symbol, e.g. `"C#4"`.
    pub fn symbol(self) -> &'static str {
        match self {
            Note::C4 => "C4",
            Note::Cs4 => "C#4",
            Note::D4 => "D4",
            Note::Ds4 => "D#4",
            Note::E4 => "E4",
            Note::F4 => "F4",
            Note::Fs4 => "F#4",
            Note::G4 => "G4",
            Note::Gs4 => "G#4",
            Note::A4 => "A4",
            Note::As4 => "A#4",
            Note::B4 => "B4",
        }
    }

    /// Equal-tempered frequency in Hz (A4 = 440).
    pub fn frequency(self) -> f32 {
        match self {
            Note::C4 => 261.63,
            Note::Cs4 => 277.18,
            Note::D4 => 293.66,
            Note::Ds4 => 311.13,
            Note::E4 => 329.63,
            Note::F4 => 349.23,
            Note::Fs4 => 369.99,
            Note::G4 => 392.00,
            Note::Gs4 => 415.30,
            Note::A4 => 440.00,
            Note::As4 => 466.16,
            Note::B4 => 493.88,
        }
    }

    /// Returns true for the raised (black key) pitches.
    pub fn is_sharp(self) -> bool {
        matches!(
            self,
            Note::Cs4 | Note::Ds4 | Note::Fs4 | Note::Gs4 | Note::As4
        )
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Note {
    type Err = ParseNoteError;

    /// Accepts the symbol case-insensitively; the octave digit may be omitted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let with_octave = if upper.ends_with('4') {
            upper
        } else {
            format!("{upper}4")
        };
        Note::all()
            .iter()
            .copied()
            .find(|n| n.symbol() == with_octave)
            .ok_or_else(|| ParseNoteError(trimmed.to_string()))
    }
}

impl TryFrom<String> for Note {
    type Error = ParseNoteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_order_matches_index() {
        for (i, note) in Note::all().iter().enumerate() {
            assert_eq!(note.index(), i);
            assert_eq!(Note::from_index(i), Some(*note));
        }
        assert_eq!(Note::from_index(NOTE_COUNT), None);
    }

    #[test]
    fn parse_symbols() {
        assert_eq!("C4".parse::<Note>().unwrap(), Note::C4);
        assert_eq!("c#4".parse::<Note>().unwrap(), Note::Cs4);
        assert_eq!("A#".parse::<Note>().unwrap(), Note::As4);
        assert_eq!(" b4 ".parse::<Note>().unwrap(), Note::B4);
        assert!("H4".parse::<Note>().is_err());
        assert!("C5".parse::<Note>().is_err());
    }

    #[test]
    fn display_roundtrips_through_parse() {
        for note in Note::all() {
            assert_eq!(note.to_string().parse::<Note>().unwrap(), *note);
        }
    }

    #[test]
    fn frequencies_ascend() {
        let freqs: Vec<f32> = Note::all().iter().map(|n| n.frequency()).collect();
        assert!(freqs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Note::A4.frequency(), 440.0);
    }

    #[test]
    fn serializes_as_symbol() {
        let json = serde_json::to_string(&Note::Fs4).unwrap();
        assert_eq!(json, "\"F#4\"");
        let back: Note = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Note::Fs4);
    }

    #[test]
    fn sharps() {
        assert!(Note::Cs4.is_sharp());
        assert!(!Note::E4.is_sharp());
        assert_eq!(Note::all().iter().filter(|n| n.is_sharp()).count(), 5);
    }
}
