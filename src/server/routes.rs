//! Router configuration for the web server.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Duty listing: configured default district, or an explicit pair
        .route("/eczaneler", get(handlers::duty_default))
        .route("/eczaneler/:city/:district", get(handlers::duty_for_district))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
