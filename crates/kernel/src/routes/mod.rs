//! HTTP route handlers.

pub mod api;
pub mod front;
pub mod health;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
///
/// Kernel endpoints are matched first; every other path falls through to
/// the navigation surface.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(api::router())
        .fallback(front::navigate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
