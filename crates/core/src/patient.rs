//! Patient service.
//!
//! Every operation loads the whole record set from the injected [`RecordStore`], applies the
//! record model, and (for mutations) saves the whole set back.
//!
//! ## Concurrency
//!
//! Mutations hold a process-wide writer lock across their load → mutate → save sequence, so
//! two writers in this process cannot lose each other's changes. Reads take no lock; the
//! store's atomic save guarantees they observe a complete set. Writers in other processes
//! sharing the same file are not coordinated.
//!
//! All methods block on file I/O; async callers should run them on a blocking pool.

use crate::record::{Patient, PatientFields};
use crate::record_set::RecordSet;
use crate::repositories::{JsonFileStore, RecordStore};
use crate::sort::{sort_patients, SortField, SortOrder};
use crate::update::PatientUpdate;
use crate::{CoreConfig, PatientError, PatientResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Pure patient data operations - no API concerns
#[derive(Clone, Debug)]
pub struct PatientService {
    store: Arc<dyn RecordStore>,
    write_lock: Arc<Mutex<()>>,
}

impl PatientService {
    /// Creates a service over an already opened store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Opens the JSON record file named by `cfg` and creates a service over it.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Storage` if the store cannot be opened.
    pub fn from_config(cfg: &CoreConfig) -> PatientResult<Self> {
        let store = JsonFileStore::open(cfg.data_file())?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Returns every patient in enumeration order.
    pub fn list(&self) -> PatientResult<RecordSet> {
        self.store.load()
    }

    /// Returns one patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no patient has this id.
    pub fn get(&self, id: &str) -> PatientResult<Patient> {
        self.store
            .load()?
            .remove(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))
    }

    /// Returns every patient sorted by a measurement.
    ///
    /// # Arguments
    ///
    /// * `sort_by` - One of `height`, `weight`, `bmi`
    /// * `order` - `asc` or `desc`; ascending when `None`
    ///
    /// # Errors
    ///
    /// Returns `PatientError::InvalidArgument` for an unknown field or order. Arguments are
    /// checked before the store is read.
    pub fn sort(&self, sort_by: &str, order: Option<&str>) -> PatientResult<Vec<Patient>> {
        let field: SortField = sort_by.parse()?;
        let order = SortOrder::parse_optional(order)?;

        let patients = self.store.load()?.into_patients();
        Ok(sort_patients(patients, field, order))
    }

    /// Validates and stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - any field is invalid (`Validation`),
    /// - a patient with the same id already exists (`Conflict`); the stored record is left
    ///   untouched,
    /// - the record set cannot be loaded or saved (`Storage`).
    pub fn create(&self, fields: PatientFields) -> PatientResult<Patient> {
        let patient = Patient::new(fields)?;

        let _guard = self.write_lock.lock();
        let mut records = self.store.load()?;
        if records.contains(patient.id()) {
            return Err(PatientError::Conflict(patient.id().to_string()));
        }
        records.insert(patient.clone());
        self.store.save(&records)?;

        tracing::info!(patient_id = patient.id(), "patient created");
        Ok(patient)
    }

    /// Applies a partial update to an existing patient.
    ///
    /// The stored record's raw fields are overlaid with the changes present in `update`, the
    /// id is forced back to `id`, and the merged fields are validated as a whole. Nothing is
    /// written unless the merged record is valid.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - no patient has this id (`NotFound`),
    /// - the merged record is invalid (`Validation`),
    /// - the record set cannot be loaded or saved (`Storage`).
    pub fn update(&self, id: &str, update: &PatientUpdate) -> PatientResult<Patient> {
        let _guard = self.write_lock.lock();
        let mut records = self.store.load()?;
        let existing = records
            .get(id)
            .ok_or_else(|| PatientError::NotFound(id.to_string()))?;

        let mut merged = existing.to_fields();
        update.apply_to(&mut merged);
        merged.id = id.to_string();
        let patient = Patient::new(merged)?;

        records.insert(patient.clone());
        self.store.save(&records)?;

        tracing::info!(
            patient_id = id,
            changed = update.changes().len(),
            "patient updated"
        );
        Ok(patient)
    }

    /// Removes a patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no patient has this id, including when it was
    /// already deleted.
    pub fn delete(&self, id: &str) -> PatientResult<()> {
        let _guard = self.write_lock.lock();
        let mut records = self.store.load()?;
        if records.remove(id).is_none() {
            return Err(PatientError::NotFound(id.to_string()));
        }
        self.store.save(&records)?;

        tracing::info!(patient_id = id, "patient deleted");
        Ok(())
    }

    /// Closes the underlying store. Call once at shutdown.
    pub fn shutdown(&self) -> PatientResult<()> {
        let _guard = self.write_lock.lock();
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::fields;
    use crate::record::Verdict;
    use crate::repositories::MemoryStore;
    use crate::update::PatientChange;
    use crate::StorageError;
    use pms_types::NonEmptyText;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn memory_service() -> PatientService {
        PatientService::new(Arc::new(MemoryStore::new()))
    }

    fn test_cfg(dir: &Path) -> CoreConfig {
        CoreConfig::new(dir.join("patients.json")).expect("CoreConfig::new should succeed")
    }

    /// Store whose saves always fail; loads delegate to an inner memory store.
    #[derive(Debug, Default)]
    struct ReadOnlyStore {
        inner: MemoryStore,
        save_attempts: AtomicUsize,
    }

    impl RecordStore for ReadOnlyStore {
        fn load(&self) -> PatientResult<RecordSet> {
            self.inner.load()
        }

        fn save(&self, _records: &RecordSet) -> PatientResult<()> {
            self.save_attempts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Write {
                path: "read-only".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            }
            .into())
        }
    }

    #[test]
    fn create_then_get_returns_identical_record() {
        let service = memory_service();
        let created = service
            .create(fields("P001", 1.75, 70.0))
            .expect("create should succeed");

        let fetched = service.get("P001").expect("get should succeed");
        assert_eq!(fetched, created);
        assert_eq!(fetched.bmi(), 22.86);
        assert_eq!(fetched.verdict(), Verdict::Normal);
        assert_eq!(
            serde_json::to_value(&fetched).unwrap(),
            serde_json::to_value(&created).unwrap()
        );
    }

    #[test]
    fn create_rejects_invalid_patient_without_touching_store() {
        let store = Arc::new(ReadOnlyStore::default());
        let service = PatientService::new(store.clone());

        let mut raw = fields("P001", 1.75, 70.0);
        raw.age = 0;
        let err = service.create(raw).expect_err("invalid age must fail");

        assert!(matches!(err, PatientError::Validation { ref field, .. } if field == "age"));
        assert_eq!(store.save_attempts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn duplicate_create_conflicts_and_keeps_existing_record() {
        let service = memory_service();
        let original = service.create(fields("P001", 1.75, 70.0)).unwrap();

        let mut replacement = fields("P001", 1.60, 95.0);
        replacement.name = "Someone Else".into();
        let err = service.create(replacement).expect_err("duplicate id must fail");

        assert!(matches!(err, PatientError::Conflict(ref id) if id == "P001"));
        assert_eq!(service.get("P001").unwrap(), original);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let service = memory_service();
        let err = service.get("P404").expect_err("missing id must fail");
        assert!(matches!(err, PatientError::NotFound(ref id) if id == "P404"));
    }

    #[test]
    fn empty_update_leaves_record_unchanged() {
        let service = memory_service();
        let original = service.create(fields("P001", 1.75, 70.0)).unwrap();

        let updated = service
            .update("P001", &PatientUpdate::new())
            .expect("empty update should succeed");

        assert_eq!(updated, original);
        assert_eq!(service.get("P001").unwrap(), original);
    }

    #[test]
    fn weight_only_update_recomputes_derived_fields() {
        let service = memory_service();
        service.create(fields("P001", 2.0, 70.0)).unwrap();

        let update = PatientUpdate::new().with(PatientChange::Weight(120.0));
        let updated = service.update("P001", &update).expect("update should succeed");

        assert_eq!(updated.height(), 2.0);
        assert_eq!(updated.weight(), 120.0);
        assert_eq!(updated.bmi(), 30.0);
        assert_eq!(updated.verdict(), Verdict::Obese);
        assert_eq!(updated.name(), "Ananya Verma");
        assert_eq!(service.get("P001").unwrap(), updated);
    }

    #[test]
    fn update_keeps_path_id_and_position() {
        let service = memory_service();
        service.create(fields("P001", 1.7, 60.0)).unwrap();
        service.create(fields("P002", 1.8, 80.0)).unwrap();

        let update = PatientUpdate::new()
            .with(PatientChange::Name(NonEmptyText::new("Kabir Rao").unwrap()));
        let updated = service.update("P001", &update).unwrap();

        assert_eq!(updated.id(), "P001");
        let records = service.list().unwrap();
        assert_eq!(records.ids().collect::<Vec<_>>(), vec!["P001", "P002"]);
        assert_eq!(records.get("P001").unwrap().name(), "Kabir Rao");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let service = memory_service();
        let err = service
            .update("P404", &PatientUpdate::new())
            .expect_err("missing id must fail");
        assert!(matches!(err, PatientError::NotFound(_)));
    }

    #[test]
    fn failed_save_leaves_previous_state() {
        let store = Arc::new(ReadOnlyStore::default());
        store
            .inner
            .save(&[Patient::new(fields("P001", 1.7, 60.0)).unwrap()]
                .into_iter()
                .collect())
            .unwrap();
        let service = PatientService::new(store.clone());

        let update = PatientUpdate::new().with(PatientChange::Age(45));
        let err = service.update("P001", &update).expect_err("save must fail");

        assert!(matches!(err, PatientError::Storage(_)));
        assert_eq!(service.get("P001").unwrap().age(), 28);
    }

    #[test]
    fn delete_is_not_idempotent() {
        let service = memory_service();
        service.create(fields("P001", 1.7, 60.0)).unwrap();

        service.delete("P001").expect("first delete should succeed");
        assert!(matches!(service.get("P001"), Err(PatientError::NotFound(_))));
        assert!(matches!(
            service.delete("P001"),
            Err(PatientError::NotFound(_))
        ));
    }

    #[test]
    fn sort_validates_arguments_before_loading() {
        let service = memory_service();
        assert!(matches!(
            service.sort("invalidfield", None),
            Err(PatientError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.sort("bmi", Some("sideways")),
            Err(PatientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sort_by_bmi_descending() {
        let service = memory_service();
        // height 1.0 makes bmi equal to weight
        service.create(fields("a", 1.0, 18.0)).unwrap();
        service.create(fields("b", 1.0, 30.0)).unwrap();
        service.create(fields("c", 1.0, 25.0)).unwrap();

        let sorted = service.sort("bmi", Some("desc")).unwrap();
        let bmis: Vec<f64> = sorted.iter().map(Patient::bmi).collect();
        assert_eq!(bmis, vec![30.0, 25.0, 18.0]);
    }

    #[test]
    fn file_backed_service_persists_across_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(temp_dir.path());

        let first = PatientService::from_config(&cfg).expect("open service");
        assert!(first.list().unwrap().is_empty());
        first.create(fields("P001", 1.75, 70.0)).unwrap();
        first.shutdown().unwrap();

        let second = PatientService::from_config(&cfg).expect("reopen service");
        assert_eq!(second.get("P001").unwrap().bmi(), 22.86);
    }

    #[test]
    fn concurrent_writers_do_not_lose_updates() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = PatientService::from_config(&test_cfg(temp_dir.path())).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                std::thread::spawn(move || {
                    service
                        .create(fields(&format!("P{i:03}"), 1.7, 60.0 + i as f64))
                        .expect("create should succeed")
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread panicked");
        }

        assert_eq!(service.list().unwrap().len(), 8);
    }
}
