use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::config::ServerConfig;
use crate::server::handlers::{chat, health, ui};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// - `GET /` serves the chat page
/// - `GET /health` reports the loaded index
/// - `POST /chat` answers a travel question
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.config.server);
    Router::new()
        .route("/", get(ui::index))
        .route("/health", get(health::health))
        .route("/chat", post(chat::chat))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let allowed_origins = resolve_allowed_origins(server)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn resolve_allowed_origins(server: &ServerConfig) -> Vec<String> {
    let origins = server
        .cors_allowed_origins
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| item.to_string())
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins(server.port);
    }

    origins
}

fn default_local_origins(port: u16) -> Vec<String> {
    let mut origins = vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ];
    for host in ["localhost", "127.0.0.1"] {
        let origin = format!("http://{}:{}", host, port);
        if !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}
