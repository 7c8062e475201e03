pub mod agent;
pub mod github;
pub mod health;
pub mod projects;
pub mod runs;
pub mod vault;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Parse an optional JSON request body. An empty body yields `T::default()`
/// so clients may POST without a payload.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::bad_request(format!("invalid JSON body: {e}")))
}

/// `Some(trimmed)` when the field is present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
