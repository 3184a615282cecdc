//! Mapping of core errors onto HTTP responses.

use api_shared::ErrorRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pms_core::PatientError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// A failure raised by the patient service.
    Patient(PatientError),
    /// The request could not be read before reaching the service.
    Rejection { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Patient(err) => match err {
                PatientError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PatientError::NotFound(_) => StatusCode::NOT_FOUND,
                PatientError::Conflict(_) | PatientError::InvalidArgument(_) => {
                    StatusCode::BAD_REQUEST
                }
                PatientError::Storage(_) | PatientError::Config(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Rejection { status, .. } => *status,
        }
    }
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        ApiError::Patient(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Patient(err) if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("patient store failure: {err}");
                "Internal error".to_string()
            }
            ApiError::Patient(err) => err.to_string(),
            ApiError::Rejection { detail, .. } => detail,
        };

        (status, Json(ErrorRes { detail })).into_response()
    }
}
