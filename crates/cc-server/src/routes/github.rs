use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::{non_blank, parse_body};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncBody {
    project_path_relative: Option<String>,
    repo_url: Option<String>,
    branch: Option<String>,
    message: Option<String>,
}

impl SyncBody {
    fn required(&self) -> Result<(&str, &str), AppError> {
        match (non_blank(&self.project_path_relative), non_blank(&self.repo_url)) {
            (Some(path), Some(url)) => Ok((path, url)),
            _ => Err(AppError::bad_request(
                "projectPathRelative and repoUrl required",
            )),
        }
    }

    fn branch(&self) -> &str {
        non_blank(&self.branch).unwrap_or_default()
    }
}

/// POST /api/github/pull — clone or update a project directory.
pub async fn pull(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: SyncBody = parse_body(&body)?;
    let (path, url) = body.required()?;
    let result = app.sync.pull(path, url, body.branch()).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "action": result.action,
        "projectDir": result.project_dir,
        "branch": result.branch,
    })))
}

/// POST /api/github/publish — commit if dirty, then push.
pub async fn publish(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: SyncBody = parse_body(&body)?;
    let (path, url) = body.required()?;
    let message = non_blank(&body.message).unwrap_or_default();
    let result = app.sync.publish(path, url, body.branch(), message).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "projectDir": result.project_dir,
        "branch": result.branch,
        "committed": result.committed,
    })))
}

/// POST /api/github/import — pull a repository into a directory named after it.
pub async fn import(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let body: SyncBody = parse_body(&body)?;
    let (Some(url), Some(branch)) = (non_blank(&body.repo_url), non_blank(&body.branch)) else {
        return Err(AppError::bad_request("repoUrl and branch required"));
    };
    let result = app.sync.import(url, branch).await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "action": result.action,
        "name": result.name,
        "projectDir": result.project_dir,
        "branch": result.branch,
    })))
}
