pub mod error;
pub mod preview;
pub mod routes;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use cc_core::config::Config;
use cc_core::paths;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let preview: Router = Router::new()
        .fallback_service(ServeDir::new(app_state.workspace()))
        .layer(middleware::from_fn(preview::hide_dotfiles));

    Router::new()
        .route("/", get(routes::health::banner))
        .route("/api/health", get(routes::health::health))
        // Projects
        .route("/api/projects", get(routes::projects::list_projects))
        .route("/api/projects", post(routes::projects::create_project))
        .route("/api/projects/{id}/run", post(routes::runs::run_project))
        // Git
        .route("/api/github/pull", post(routes::github::pull))
        .route("/api/github/publish", post(routes::github::publish))
        .route("/api/github/import", post(routes::github::import))
        // Vault
        .route("/api/vault", get(routes::vault::list_keys))
        .route("/api/vault", post(routes::vault::upsert))
        // Agent
        .route("/api/openclaw/prompt", post(routes::agent::prompt))
        // Built project output, for the dashboard's iframe
        .nest_service("/preview", preview)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Start the command center API on `host:port`.
///
/// Vault entries are expected to be in the process environment already; the
/// CLI exports them before the runtime starts.
pub async fn serve(home: PathBuf, config: Config, open_browser: bool) -> anyhow::Result<()> {
    paths::ensure_layout(&home)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual = listener.local_addr()?;
    let app = build_router(AppState::new(home, config));

    tracing::info!("command center listening on http://{actual}");

    if open_browser {
        let url = format!("http://{actual}");
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
