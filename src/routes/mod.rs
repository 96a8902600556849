// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::computer_repo::ComputerRepo;
use crate::config::AppConfig;
use crate::dashboard::Renderer;
use crate::notifier::TelegramNotifier;
use crate::registry::ConnectionRegistry;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Arc<ConnectionRegistry>,
    pub(crate) computer_repo: Arc<ComputerRepo>,
    pub(crate) notifier: TelegramNotifier,
    pub(crate) renderer: Renderer,
    pub(crate) config: AppConfig,
}

pub fn app(
    registry: Arc<ConnectionRegistry>,
    computer_repo: Arc<ComputerRepo>,
    notifier: TelegramNotifier,
    config: AppConfig,
) -> Router {
    let renderer = Renderer::for_locale(&config.dashboard.locale).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Falling back to default dashboard locale");
        Renderer::default()
    });
    let state = AppState {
        registry,
        computer_repo,
        notifier,
        renderer,
        config,
    };
    Router::new()
        .route("/", get(http::dashboard_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/status", get(http::api_status_handler)) // GET /api/status
        .route("/ws", get(ws::ws_agent)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
