//! HTTP surface (§6.1): an axum router wrapping the engine.
//!
//! Grounded on `other_examples/.../ssrf.rs`'s axum router-construction
//! and `tower-http` tracing-layer shape; the teacher carries no HTTP
//! framework at all, so this crate is pack-enrichment rather than
//! teacher-imitation.

pub mod config;
mod error;
mod handlers;
mod state;

pub use state::AppState;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the router. `cors_origins` is the exact allowlist from
/// `CORS_ORIGINS` (§6.4): a wildcard is never emitted, since the router
/// also carries credentialed requests (rate-limiting keys off the
/// caller's address, not a cookie, but the origin policy is still
/// explicit-list-only per spec).
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Router::new()
        .route("/analyze", post(handlers::analyze::analyze))
        .route("/report", post(handlers::report::report))
        .route("/ingest", post(handlers::ingest::ingest))
        .route("/health", get(handlers::health::health))
        .route("/settings", get(handlers::settings::get_settings))
        .route("/settings/mode", post(handlers::settings::set_mode))
        .route("/whois/:domain", get(handlers::whois::whois))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Binds `bind_addr` and serves `app` forever, exposing the caller's
/// address to the rate limiter via axum's connect-info extractor (§4.9).
/// Used by both this crate's own binary and `alerta-cli`'s `serve`
/// subcommand so the two entry points can't drift.
pub async fn serve(app: Router, bind_addr: &str) {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: failed to bind {bind_addr}: {e}"));

    tracing::info!(addr = bind_addr, "alerta-server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
