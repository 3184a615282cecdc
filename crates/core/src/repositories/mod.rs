//! Record store implementations.
//!
//! The whole record set is the unit of persistence: it is always read in full and written in
//! full. [`RecordStore`] is the seam services depend on; [`JsonFileStore`] is the on-disk
//! implementation and [`MemoryStore`] backs tests and embedding.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::record_set::RecordSet;
use crate::PatientResult;

/// Load/save access to the persisted record set.
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Reads the entire record set.
    ///
    /// A store that has never been written returns an empty set.
    fn load(&self) -> PatientResult<RecordSet>;

    /// Replaces the persisted record set. Readers observe either the previous set or this
    /// one, never a mixture.
    fn save(&self, records: &RecordSet) -> PatientResult<()>;

    /// Releases the store at shutdown.
    fn close(&self) -> PatientResult<()> {
        Ok(())
    }
}
