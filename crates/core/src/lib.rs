//! # PMS Core
//!
//! Core business logic for the patient management system.
//!
//! This crate contains the record model and its persistence:
//! - Patient validation with derived body mass index and verdict
//! - Partial updates merged over the stored record and re-validated
//! - Whole-set load/save through a [`RecordStore`](repositories::RecordStore)
//!
//! **No API concerns**: HTTP servers, routing and wire DTOs belong in `api-rest` or `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod patient;
pub mod record;
pub mod record_set;
pub mod repositories;
pub mod sort;
pub mod update;
pub mod validation;

pub use config::CoreConfig;
pub use constants::DEFAULT_DATA_FILE;
pub use error::{PatientError, PatientResult, StorageError};
pub use patient::PatientService;
pub use record::{Gender, Patient, PatientFields, Verdict};
pub use record_set::RecordSet;
pub use sort::{SortField, SortOrder};
pub use update::{PatientChange, PatientUpdate};

// Re-export so callers can use the text type without a direct dependency.
pub use pms_types::{NonEmptyText, TextError};
