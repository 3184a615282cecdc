use std::path::PathBuf;

/// Errors returned by patient operations.
///
/// Each variant maps to a distinct client-facing outcome; transports translate them into
/// status codes without inspecting the message text.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid value for '{field}': {reason}")]
    Validation { field: String, reason: String },
    #[error("Patient not found: {0}")]
    NotFound(String),
    #[error("Patient with this ID already exists: {0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PatientError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PatientError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of the persisted record set.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read record file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write record file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("record file {} is corrupt at {location}: {message}", path.display())]
    Corrupt {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("failed to serialise record set: {0}")]
    Serialization(serde_json::Error),
    #[error("record key '{key}' does not match its id '{id}'")]
    KeyMismatch { key: String, id: String },
    #[error("stored record '{key}' is invalid: {source}")]
    InvalidRecord {
        key: String,
        #[source]
        source: Box<PatientError>,
    },
    #[error("record path {} is not a file", .0.display())]
    NotAFile(PathBuf),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
