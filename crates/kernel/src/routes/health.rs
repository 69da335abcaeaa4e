//! Health check endpoint.
//!
//! Always 200 while the process serves requests; reports the size of the
//! current module snapshot.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    modules_available: usize,
    modules_enabled: usize,
    routes: usize,
    warnings: usize,
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshot();
    Json(HealthResponse {
        status: "healthy",
        modules_available: state.available().len(),
        modules_enabled: snapshot.registry.len(),
        routes: snapshot.table.len(),
        warnings: snapshot.registry.diagnostics().len(),
    })
}

/// Create the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
