//! HTTP API for driving the assistant from another process
//!
//! For devices whose push-to-talk button is wired to a separate program:
//! - POST /recording/toggle - Start or stop recording
//! - POST /shutdown - Leave the main loop
//! - GET /status - Pipeline snapshot
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

use anyhow::{Context, Result};
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Serve the API on its own thread with a dedicated tokio runtime.
///
/// The listener is bound before this returns, so a bad address fails
/// startup instead of being logged from the background thread.
pub fn spawn_server(bind: &str, state: AppState) -> Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .context("Failed to build HTTP runtime")?;

    let listener = runtime
        .block_on(tokio::net::TcpListener::bind(bind))
        .with_context(|| format!("Failed to bind HTTP API to {}", bind))?;

    info!("HTTP API listening on {}", bind);

    let app = create_router(state);
    thread::Builder::new()
        .name("http-api".to_string())
        .spawn(move || {
            if let Err(e) = runtime.block_on(async move { axum::serve(listener, app).await }) {
                error!("HTTP API stopped: {}", e);
            }
        })
        .context("Failed to spawn HTTP API thread")
}
