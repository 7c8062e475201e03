use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Axum middleware for `/preview`: any path segment starting with `.`
/// (literal or percent-encoded) is answered with 404, so `.git/`, `.env`
/// and the `.command-center` run logs are never served.
pub async fn hide_dotfiles(req: Request, next: Next) -> Response {
    if has_hidden_segment(req.uri().path()) {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(req).await
}

fn has_hidden_segment(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|p| p.eq_ignore_ascii_case("%2e"))
    })
}
