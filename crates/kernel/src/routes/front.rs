//! Navigation surface: every path not claimed by the kernel's own
//! endpoints is a navigation into the composed route table.

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::AppError;
use crate::menu::{breadcrumb, visible_navigation, visible_quick_actions};
use crate::routing::{Navigation, NavigationOutcome, NavigationRequest};
use crate::session::Caller;
use crate::shell::ShellPage;
use crate::state::AppState;

/// Fallback handler rendering the shell around a navigation outcome.
///
/// The snapshot is taken once, so the route table cannot change while the
/// navigation runs. The load is cancelled if the client goes away.
pub async fn navigate(
    State(state): State<AppState>,
    Caller(caller): Caller,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let path = uri.path();
    let snapshot = state.snapshot();

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let navigation = Navigation::start(
        &snapshot.guard,
        NavigationRequest::new(path, caller.clone()),
        cancel,
        Some(state.config().load_timeout),
    );
    let outcome = navigation.finish().await;

    let nav_items = visible_navigation(&snapshot.registry, &caller);
    let quick_actions = visible_quick_actions(&snapshot.registry, &snapshot.table, &caller);

    let (status, heading, message, body) = match &outcome {
        NavigationOutcome::Rendered(page) => (
            StatusCode::OK,
            page.route.title().to_string(),
            None,
            Some(page.view.body.as_str()),
        ),
        NavigationOutcome::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            "Page not found".to_string(),
            Some("No page is registered at this address."),
            None,
        ),
        NavigationOutcome::Forbidden { .. } => (
            StatusCode::FORBIDDEN,
            "Access denied".to_string(),
            Some("You do not have permission to view this page."),
            None,
        ),
        NavigationOutcome::LoadFailed { error, .. } => {
            warn!(path = %path, error = %error, "page failed to load");
            (
                StatusCode::BAD_GATEWAY,
                "Page failed to load".to_string(),
                Some("The page could not be loaded. Try again later."),
                None,
            )
        }
        NavigationOutcome::Abandoned { .. } => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Navigation abandoned".to_string(),
            None,
            None,
        ),
    };

    // Only authorized navigations reveal where the caller is.
    let crumb = match &outcome {
        NavigationOutcome::Rendered(_) | NavigationOutcome::LoadFailed { .. } => {
            breadcrumb(&snapshot.registry, &snapshot.table, path)
        }
        _ => None,
    };

    let page = ShellPage {
        path,
        outcome: outcome.kind(),
        navigation: &nav_items,
        quick_actions: &quick_actions,
        crumb: crumb.as_ref(),
        heading: &heading,
        message,
        body,
    };

    match state.shell().render(&page) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::Internal(e).into_response(),
    }
}
