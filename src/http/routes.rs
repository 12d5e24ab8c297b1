use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Pipeline queries
        .route("/status", get(handlers::get_status))
        // Push-to-talk control
        .route("/recording/toggle", post(handlers::toggle_recording))
        .route("/shutdown", post(handlers::shutdown))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
