use axum::extract::State;
use axum::Json;

use crate::error::{join_error, AppError};
use crate::state::AppState;

/// GET / — plain-text banner.
pub async fn banner() -> &'static str {
    "Command Center API running. Try /api/health"
}

/// GET /api/health — liveness plus which external tools are on PATH.
pub async fn health(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let agent = app
        .config
        .agent
        .executable
        .clone()
        .unwrap_or_else(|| "openclaw".to_string());
    let tools = tokio::task::spawn_blocking(move || {
        serde_json::json!({
            "git": which::which("git").is_ok(),
            "npm": which::which("npm").is_ok(),
            "openclaw": which::which(&agent).is_ok(),
        })
    })
    .await
    .map_err(join_error)?;

    Ok(Json(serde_json::json!({ "ok": true, "tools": tools })))
}
