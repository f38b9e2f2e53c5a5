// Persistence of the player's progress record: high score, games played,
// last-played difficulty and achievement unlock state.

pub mod file_store;
pub mod memory_store;
pub mod progress_store;
pub mod record;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use progress_store::{ProgressStore, UnlockOutcome};
pub use record::PersistedRecord;

use anyhow::Result;

/// Backing storage for the progress record.
///
/// Implementations: JsonFileStore (production), MemoryStore (tests and
/// `--no-save` runs).
pub trait PersistenceGateway {
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&mut self) -> Result<Option<PersistedRecord>>;

    fn save(&mut self, record: &PersistedRecord) -> Result<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load(&mut self) -> Result<Option<PersistedRecord>> {
        (**self).load()
    }

    fn save(&mut self, record: &PersistedRecord) -> Result<()> {
        (**self).save(record)
    }
}
