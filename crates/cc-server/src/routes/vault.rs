use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use super::parse_body;
use crate::error::{join_error, AppError};
use crate::state::AppState;

/// GET /api/vault — key names only.
pub async fn list_keys(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let vault = app.vault.clone();
    let keys = tokio::task::spawn_blocking(move || vault.keys())
        .await
        .map_err(join_error)??;
    Ok(Json(serde_json::json!({ "keys": keys })))
}

/// POST /api/vault — `{"entries": {KEY: value}}`. Null values are skipped;
/// non-string values are stored as their JSON text.
pub async fn upsert(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: serde_json::Value = parse_body(&body)?;
    let Some(entries) = body.get("entries").and_then(|e| e.as_object()) else {
        return Err(AppError::bad_request("entries object required"));
    };
    let entries: Vec<(String, String)> = entries
        .iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect();

    let vault = app.vault.clone();
    let keys = tokio::task::spawn_blocking(move || vault.upsert(entries))
        .await
        .map_err(join_error)??;
    Ok(Json(serde_json::json!({ "ok": true, "keys": keys })))
}
