use anyhow::Result;
use log::debug;
use memoria_types::Note;

use crate::sink::NoteSink;
use crate::{PlaybackGateway, PlaybackTicket};

/// Default delay between the starts of consecutive notes (microseconds).
pub const DEFAULT_NOTE_INTERVAL_US: i64 = 400_000;

#[derive(Debug)]
struct Performance {
    ticket: PlaybackTicket,
    notes: Vec<Note>,
    start_us: i64,
    /// Index of the next note to sound.
    next_index: usize,
}

impl Performance {
    fn end_us(&self, interval_us: i64) -> i64 {
        self.start_us + self.notes.len() as i64 * interval_us
    }
}

/// Performs sequences note by note with a fixed interval.
///
/// Note `i` sounds at `start + i * interval`; the performance resolves one
/// interval after the last note started. Time only advances through
/// `perform_sequence`, `poll_complete` and `pump`.
pub struct PacedPlayback<S> {
    sink: S,
    interval_us: i64,
    next_ticket: u64,
    current: Option<Performance>,
}

impl<S: NoteSink> PacedPlayback<S> {
    pub fn new(sink: S) -> Self {
        Self::with_interval(sink, DEFAULT_NOTE_INTERVAL_US)
    }

    pub fn with_interval(sink: S, interval_us: i64) -> Self {
        Self {
            sink,
            interval_us: interval_us.max(1),
            next_ticket: 1,
            current: None,
        }
    }

    pub fn interval_us(&self) -> i64 {
        self.interval_us
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns true while a performance is in progress.
    pub fn is_performing(&self) -> bool {
        self.current.is_some()
    }

    /// Sounds every note of the current performance that is due at `now_us`.
    pub fn pump(&mut self, now_us: i64) {
        let Some(perf) = self.current.as_mut() else {
            return;
        };
        while perf.next_index < perf.notes.len() {
            let due = perf.start_us + perf.next_index as i64 * self.interval_us;
            if due > now_us {
                break;
            }
            self.sink.sound(perf.notes[perf.next_index]);
            perf.next_index += 1;
        }
    }
}

impl<S: NoteSink> PlaybackGateway for PacedPlayback<S> {
    fn perform_sequence(&mut self, notes: &[Note], now_us: i64) -> Result<PlaybackTicket> {
        let ticket = PlaybackTicket(self.next_ticket);
        self.next_ticket += 1;

        if let Some(prev) = self.current.take() {
            debug!("playback {:?} superseded by {:?}", prev.ticket, ticket);
        }
        self.current = Some(Performance {
            ticket,
            notes: notes.to_vec(),
            start_us: now_us,
            next_index: 0,
        });
        self.pump(now_us);
        Ok(ticket)
    }

    fn poll_complete(&mut self, ticket: PlaybackTicket, now_us: i64) -> bool {
        match &self.current {
            Some(perf) if perf.ticket == ticket => {}
            _ => return true,
        }
        self.pump(now_us);
        let done = self
            .current
            .as_ref()
            .is_some_and(|perf| now_us >= perf.end_us(self.interval_us));
        if done {
            self.current = None;
        }
        done
    }

    fn trigger_note(&mut self, note: Note) {
        self.sink.sound(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    const MS: i64 = 1000;

    #[test]
    fn notes_sound_on_schedule() {
        let mut playback = PacedPlayback::new(RecordingSink::new());
        let ticket = playback
            .perform_sequence(&[Note::C4, Note::E4, Note::G4], 0)
            .unwrap();
        assert_eq!(playback.sink().notes(), &[Note::C4]);

        assert!(!playback.poll_complete(ticket, 399 * MS));
        assert_eq!(playback.sink().notes().len(), 1);

        assert!(!playback.poll_complete(ticket, 400 * MS));
        assert_eq!(playback.sink().notes(), &[Note::C4, Note::E4]);

        assert!(!playback.poll_complete(ticket, 1199 * MS));
        assert_eq!(playback.sink().notes(), &[Note::C4, Note::E4, Note::G4]);

        assert!(playback.poll_complete(ticket, 1200 * MS));
        assert!(!playback.is_performing());
    }

    #[test]
    fn late_poll_sounds_everything_in_order() {
        let mut playback = PacedPlayback::with_interval(RecordingSink::new(), 100 * MS);
        let ticket = playback
            .perform_sequence(&[Note::D4, Note::D4, Note::C4], 1_000 * MS)
            .unwrap();
        assert!(playback.poll_complete(ticket, 5_000 * MS));
        assert_eq!(playback.sink().notes(), &[Note::D4, Note::D4, Note::C4]);
    }

    #[test]
    fn new_performance_supersedes_old_ticket() {
        let mut playback = PacedPlayback::new(RecordingSink::new());
        let first = playback.perform_sequence(&[Note::C4, Note::C4], 0).unwrap();
        let second = playback.perform_sequence(&[Note::B4], 10 * MS).unwrap();
        assert_ne!(first, second);

        // The old ticket is no longer tracked.
        assert!(playback.poll_complete(first, 20 * MS));
        assert!(!playback.poll_complete(second, 20 * MS));
        assert!(playback.poll_complete(second, 410 * MS));
    }

    #[test]
    fn trigger_note_is_immediate() {
        let mut playback = PacedPlayback::new(RecordingSink::new());
        playback.trigger_note(Note::Fs4);
        assert_eq!(playback.sink().notes(), &[Note::Fs4]);
        assert!(!playback.is_performing());
    }

    #[test]
    fn empty_sequence_completes_at_once() {
        let mut playback = PacedPlayback::new(RecordingSink::new());
        let ticket = playback.perform_sequence(&[], 0).unwrap();
        assert!(playback.poll_complete(ticket, 0));
    }
}
