//! Record set persisted as a single JSON document.
//!
//! ## Storage Layout
//!
//! ```text
//! {
//!     "P001": { "id": "P001", "name": ..., "height": 1.75, "weight": 70.0, "bmi": 22.86, "verdict": "normal" },
//!     ...
//! }
//! ```
//!
//! `bmi` and `verdict` are written for readers of the file but ignored on load; they are
//! recomputed from height and weight.
//!
//! Writes go to a temporary file in the same directory which is synced and then renamed over
//! the target, so a concurrent reader sees either the old or the new document in full.

use super::RecordStore;
use crate::constants::RECORD_FILE_INDENT;
use crate::error::StorageError;
use crate::record::{Patient, PatientFields};
use crate::record_set::RecordSet;
use crate::PatientResult;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Record store backed by one JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store at `path`, creating the containing directory if needed.
    ///
    /// The file itself is not created until the first save.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Storage` if:
    /// - `path` is an existing directory,
    /// - the containing directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> PatientResult<Self> {
        let path = path.into();
        if path.is_dir() {
            return Err(StorageError::NotAFile(path).into());
        }

        let dir = parent_dir(&path);
        fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            path: dir.clone(),
            source,
        })?;

        tracing::info!("opened record store at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> PatientResult<RecordSet> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    "record file {} does not exist yet, starting empty",
                    self.path.display()
                );
                return Ok(RecordSet::new());
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                }
                .into())
            }
        };

        decode(&self.path, &bytes)
    }

    fn save(&self, records: &RecordSet) -> PatientResult<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(RECORD_FILE_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records
            .serialize(&mut serializer)
            .map_err(StorageError::Serialization)?;

        let write_err = |source: io::Error| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(parent_dir(&self.path)).map_err(write_err)?;
        tmp.write_all(&buf).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(
            "saved {} patient records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn close(&self) -> PatientResult<()> {
        tracing::info!("closed record store at {}", self.path.display());
        Ok(())
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn decode(path: &Path, bytes: &[u8]) -> PatientResult<RecordSet> {
    let corrupt = |location: String, message: String| StorageError::Corrupt {
        path: path.to_path_buf(),
        location,
        message,
    };

    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let raw: IndexMap<String, PatientFields> =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
            let location = err.path().to_string();
            let location = if location.is_empty() || location == "." {
                "<root>".to_string()
            } else {
                location
            };
            corrupt(location, err.into_inner().to_string())
        })?;
    deserializer
        .end()
        .map_err(|err| corrupt("<root>".into(), err.to_string()))?;

    let mut records = RecordSet::new();
    for (key, fields) in raw {
        let patient = Patient::new(fields).map_err(|e| StorageError::InvalidRecord {
            key: key.clone(),
            source: Box::new(e),
        })?;
        if patient.id() != key {
            return Err(StorageError::KeyMismatch {
                key,
                id: patient.id().to_string(),
            }
            .into());
        }
        records.insert(patient);
    }

    Ok(records)
}
