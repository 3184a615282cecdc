use crate::error::ApiError;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use pms_core::PatientError;
use serde::de::DeserializeOwned;

/// JSON body extractor that reports the path of the offending field.
///
/// Decoding failures become `422` validation errors such as
/// `invalid value for 'age': invalid type: string "old", expected i64`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejection {
                status: rejection.status(),
                detail: rejection.body_text(),
            })?;

        decode(&bytes).map(JsonBody)
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let field = if path.is_empty() || path == "." {
            "body".to_string()
        } else {
            path
        };
        PatientError::validation(field, err.into_inner().to_string())
    })?;

    deserializer.end().map_err(|err| ApiError::Rejection {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        detail: format!("invalid JSON body: {err}"),
    })?;

    Ok(value)
}
