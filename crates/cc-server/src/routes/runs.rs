use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cc_core::types::RunMode;
use serde::Deserialize;

use super::{non_blank, parse_body};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct RunBody {
    mode: Option<String>,
}

/// POST /api/projects/{id}/run — install + build/dev with one repair retry.
///
/// Responds 200 on success and 500 with the full outcome when the build
/// still fails after the retry.
pub async fn run_project(
    State(app): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let body: RunBody = parse_body(&body)?;
    let mode = match non_blank(&body.mode) {
        Some(m) => m.parse::<RunMode>()?,
        None => RunMode::default(),
    };

    let outcome = app.orchestrator.run(&id, mode).await?;
    let status = if outcome.success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(serde_json::to_value(outcome)?)))
}
