use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{non_blank, parse_body};
use crate::error::{join_error, AppError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectBody {
    name: Option<String>,
    path_relative: Option<String>,
}

/// GET /api/projects — all projects, newest first.
pub async fn list_projects(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let registry = app.registry.clone();
    let projects = tokio::task::spawn_blocking(move || registry.list())
        .await
        .map_err(join_error)??;
    Ok(Json(serde_json::to_value(projects)?))
}

/// POST /api/projects — register a project and create its directory.
pub async fn create_project(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let body: CreateProjectBody = parse_body(&body)?;
    let (Some(name), Some(path)) = (non_blank(&body.name), non_blank(&body.path_relative)) else {
        return Err(AppError::bad_request("name and pathRelative required"));
    };
    let (name, path) = (name.to_string(), path.to_string());
    let registry = app.registry.clone();
    let project = tokio::task::spawn_blocking(move || registry.create(&name, &path))
        .await
        .map_err(join_error)??;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(project)?)))
}
