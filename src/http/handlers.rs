use super::state::AppState;
use crate::pipeline::ControlEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/toggle
/// Press the push-to-talk button
pub async fn toggle_recording(State(state): State<AppState>) -> impl IntoResponse {
    info!("Toggle requested over HTTP");
    send_event(&state, ControlEvent::Toggle, "toggled", "Recording toggled")
}

/// POST /shutdown
/// Stop the assistant
pub async fn shutdown(State(state): State<AppState>) -> impl IntoResponse {
    info!("Shutdown requested over HTTP");
    send_event(&state, ControlEvent::Quit, "stopping", "Assistant is shutting down")
}

/// GET /status
/// Latest pipeline snapshot
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.status.snapshot();
    (StatusCode::OK, Json(status))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

fn send_event(
    state: &AppState,
    event: ControlEvent,
    status: &str,
    message: &str,
) -> axum::response::Response {
    match state.control.try_send(event) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(ControlResponse {
                status: status.to_string(),
                message: message.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to deliver {:?}: {}", event, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Assistant is not accepting commands".to_string(),
                }),
            )
                .into_response()
        }
    }
}
