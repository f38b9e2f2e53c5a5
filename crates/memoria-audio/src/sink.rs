use memoria_types::Note;

/// The opaque "make this tone" capability behind playback.
pub trait NoteSink {
    fn sound(&mut self, note: Note);
}

impl<F: FnMut(Note)> NoteSink for F {
    fn sound(&mut self, note: Note) {
        self(note)
    }
}

/// Remembers every note it was asked to sound.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notes: Vec<Note>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Drain the recorded notes.
    pub fn drain(&mut self) -> Vec<Note> {
        std::mem::take(&mut self.notes)
    }
}

impl NoteSink for RecordingSink {
    fn sound(&mut self, note: Note) {
        self.notes.push(note);
    }
}
