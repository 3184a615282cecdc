//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Core code never reads process-wide environment variables while handling a request.

use crate::constants::DEFAULT_DATA_FILE;
use crate::{PatientError, PatientResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::Config`] if `data_file` is empty.
    pub fn new(data_file: PathBuf) -> PatientResult<Self> {
        if data_file.as_os_str().is_empty() {
            return Err(PatientError::Config(
                "record file path cannot be empty".into(),
            ));
        }

        Ok(Self { data_file })
    }

    /// Location of the JSON document holding the whole record set.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Resolve the record file from an optional (environment) value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_DATA_FILE`].
pub fn data_file_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}
