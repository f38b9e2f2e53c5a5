use anyhow::{Result, bail};

use crate::PersistenceGateway;
use crate::record::PersistedRecord;

/// Keeps the record in memory. The failure switches simulate storage that
/// is disabled or full.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: Option<PersistedRecord>,
    fail_reads: bool,
    fail_writes: bool,
    saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PersistedRecord) -> Self {
        Self {
            record: Some(record),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// The stored record, bypassing the failure switches.
    pub fn record(&self) -> Option<&PersistedRecord> {
        self.record.as_ref()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> u32 {
        self.saves
    }
}

impl PersistenceGateway for MemoryStore {
    fn load(&mut self) -> Result<Option<PersistedRecord>> {
        if self.fail_reads {
            bail!("storage unavailable: read refused");
        }
        Ok(self.record.clone())
    }

    fn save(&mut self, record: &PersistedRecord) -> Result<()> {
        if self.fail_writes {
            bail!("storage unavailable: write refused");
        }
        self.record = Some(record.clone());
        self.saves += 1;
        Ok(())
    }
}
