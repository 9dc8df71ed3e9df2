//! HTTP/WebSocket server for the ideation agent
//!
//! REST routes under `/api`, a per-session WebSocket under `/ws/sessions/:id`
//! and an SSE stream under `/api/sessions/:id/events`.

mod auth;
pub mod error;
mod events;
pub mod routes;
pub mod state;
mod timing;

pub use auth::{generate_auth_token, AuthLayer};
pub use error::{ApiError, ValidatedJson};
pub use events::{SessionBroadcaster, DEFAULT_CHANNEL_CAPACITY};
pub use state::AppState;

use anyhow::Context;
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue,
    },
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Serialize)]
struct VersionInfo {
    version: String,
}

/// CORS for the configured origins, or any origin when none are listed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    cors.allow_origin(allowed)
}

/// Build the full application router
///
/// Layer order: cors (outer) -> auth -> timing -> handler, so preflight
/// requests are answered before the token check.
pub fn build_router(state: AppState) -> Router {
    let api = routes::api_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        timing::record_timing,
    ));

    Router::new()
        .merge(api)
        .route("/ws/sessions/:id", get(events::ws_handler))
        .route("/api/version", get(version_handler))
        .route("/health", get(health_handler))
        .layer(AuthLayer::new(state.config.server.auth_token.clone()))
        .layer(cors_layer(&state.config.server.cors_origins))
        .with_state(state)
}

/// Serve until shutdown is requested, then interrupt running sessions
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let server = &state.config.server;
    let addr: SocketAddr = format!("{}:{}", server.bind, server.port)
        .parse()
        .with_context(|| format!("Invalid address {}:{}", server.bind, server.port))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let cors_display = if server.cors_origins.is_empty() {
        "*".to_string()
    } else {
        server.cors_origins.join(", ")
    };
    log::info!("Ideation agent listening on http://{}", addr);
    log::info!("CORS origins: {}", cors_display);
    log::info!(
        "Session storage: {}",
        if state.store.is_persistent() { "JSON files" } else { "in memory" }
    );
    if server.auth_token.is_some() {
        log::info!("Bearer token required on /api and /ws routes");
    }

    let app = build_router(state.clone());

    // Closing every event channel ends open SSE and WebSocket streams, which
    // graceful shutdown would otherwise wait on
    let shutdown_signal = async move {
        state.shutdown_state.wait().await;
        log::info!("Shutdown signal received, stopping server...");
        let result = crate::shutdown::cleanup(&state.store, &state.notifier);
        if !result.is_clean() {
            log::warn!("Shutdown finished with {} error(s)", result.errors.len());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
