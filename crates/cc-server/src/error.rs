use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cc_core::CcError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses. The body is always
/// `{"ok": false, "error": "<message>"}`.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(CcError::Validation(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<CcError>() {
            Some(e) => match e {
                CcError::ProjectNotFound(_) | CcError::NotFound(_) => StatusCode::NOT_FOUND,
                CcError::Validation(_) | CcError::InvalidPath(_) | CcError::InvalidVaultKey(_) => {
                    StatusCode::BAD_REQUEST
                }
                CcError::Git { .. }
                | CcError::Agent(_)
                | CcError::Spawn { .. }
                | CcError::HomeNotFound
                | CcError::Io(_)
                | CcError::Yaml(_)
                | CcError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "ok": false, "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Join a `spawn_blocking` task, mapping a panic/cancel to a 500.
pub(crate) fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError(anyhow::anyhow!("task join error: {e}"))
}
