//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for the wallet operations
//! - Error-to-status mapping
//! - CORS configuration

pub mod routes;

use axum::Router;
use axum::http::{HeaderValue, Method};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use wallet_core::wallet::WalletService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The wallet service.
    pub wallet: Arc<WalletService>,
}

/// Creates the main application router.
///
/// `allowed_origins` is the CORS allow-list; an empty list allows any
/// origin (development only).
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if allowed_origins.is_empty() {
        warn!("no CORS origins configured, allowing any origin");
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}
