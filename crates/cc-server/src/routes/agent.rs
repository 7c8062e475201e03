use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use cc_core::agent::resolve_prompt;
use serde::Deserialize;

use super::{non_blank, parse_body};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptBody {
    prompt: Option<String>,
    mode: Option<String>,
    /// Dashboards send ids as strings or numbers.
    project_id: Option<serde_json::Value>,
}

/// POST /api/openclaw/prompt — forward a prompt to the agent.
pub async fn prompt(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: PromptBody = parse_body(&body)?;
    let project_id = body.project_id.as_ref().and_then(|v| match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    let prompt = resolve_prompt(
        body.prompt.as_deref(),
        non_blank(&body.mode),
        project_id.as_deref(),
    )?;

    let agent = &app.agent;
    let text = prompt.as_str();
    let output = app
        .prompt_cache
        .get_or_try_insert_with(text, move || async move {
            agent.prompt(text).await.map(|reply| reply.to_json())
        })
        .await?;
    Ok(Json(serde_json::json!({ "ok": true, "output": output })))
}
