// Note playback: the gateway the game uses to perform sequences and sound
// single key presses.

pub mod paced;
pub mod sink;

pub use paced::PacedPlayback;
pub use sink::{NoteSink, RecordingSink};

use anyhow::Result;
use memoria_types::Note;

/// Handle for one `perform_sequence` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackTicket(pub u64);

/// Abstraction over sequence playback.
/// Implementations: PacedPlayback (fixed inter-note delay over any NoteSink).
pub trait PlaybackGateway {
    /// Starts performing `notes` in order at `now_us`.
    fn perform_sequence(&mut self, notes: &[Note], now_us: i64) -> Result<PlaybackTicket>;

    /// Advances the performance to `now_us` and reports whether the
    /// performance identified by `ticket` has finished. Unknown or
    /// superseded tickets report finished.
    fn poll_complete(&mut self, ticket: PlaybackTicket, now_us: i64) -> bool;

    /// Sounds a single note immediately. Fire-and-forget.
    fn trigger_note(&mut self, note: Note);
}

impl<P: PlaybackGateway + ?Sized> PlaybackGateway for Box<P> {
    fn perform_sequence(&mut self, notes: &[Note], now_us: i64) -> Result<PlaybackTicket> {
        (**self).perform_sequence(notes, now_us)
    }

    fn poll_complete(&mut self, ticket: PlaybackTicket, now_us: i64) -> bool {
        (**self).poll_complete(ticket, now_us)
    }

    fn trigger_note(&mut self, note: Note) {
        (**self).trigger_note(note)
    }
}
