//! REST API for production planning.
//!
//! Provides two endpoints:
//! - `POST /productionplan`: computes a plan for a JSON payload
//! - `GET /health`: liveness probe

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::dispatch::Optimizer;

pub use types::ErrorResponse;

/// Immutable application state shared across all request handlers.
///
/// Each request builds its own unit records, so no locks are needed.
#[derive(Debug, Default)]
pub struct AppState {
    /// Optimizer configured from the service settings.
    pub optimizer: Optimizer,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/productionplan", post(handlers::production_plan))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
