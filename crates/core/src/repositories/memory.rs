use super::RecordStore;
use crate::record_set::RecordSet;
use crate::PatientResult;
use parking_lot::Mutex;

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<RecordSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: RecordSet) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> PatientResult<RecordSet> {
        Ok(self.records.lock().clone())
    }

    fn save(&self, records: &RecordSet) -> PatientResult<()> {
        *self.records.lock() = records.clone();
        Ok(())
    }
}
