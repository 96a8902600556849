// GET handlers: dashboard page, version, api/status

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::AppState;
use crate::dashboard::Page;
use crate::status::collect_status;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/status — all known computers (most recently seen first) with online counts.
pub(super) async fn api_status_handler(State(state): State<AppState>) -> Response {
    match collect_status(&state.computer_repo, &state.registry).await {
        Ok(status) => axum::Json(status).into_response(),
        Err(e) => {
            tracing::error!(error = %e, operation = "collect_status", "status request failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// GET / — dashboard page pre-rendered with the current status.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> Response {
    match render_dashboard(&state).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, operation = "render_dashboard", "dashboard request failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn render_dashboard(state: &AppState) -> anyhow::Result<String> {
    let status = collect_status(&state.computer_repo, &state.registry).await?;
    let mut page = Page::dashboard();
    state.renderer.render_status(&mut page, &status)?;
    Ok(page.to_html()?)
}
