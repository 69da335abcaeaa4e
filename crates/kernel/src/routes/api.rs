//! Kernel JSON endpoints under `/_portico`.
//!
//! Read endpoints answer for the requesting caller. The route table dump
//! and membership changes require the configured admin token.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::caller::CallerContext;
use crate::error::{AppError, AppResult};
use crate::menu::{Breadcrumb, NavItem, QuickActionItem};
use crate::menu::{breadcrumb, visible_navigation, visible_quick_actions};
use crate::permissions::{allowed_actions, can_perform};
use crate::routing::NavigationRequest;
use crate::session::Caller;
use crate::state::AppState;

/// Create the kernel API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/_portico/routes", get(list_routes))
        .route("/_portico/navigation", get(navigation))
        .route("/_portico/modules/{id}/actions", get(module_actions))
        .route("/_portico/modules/{id}/actions/{action}", get(check_action))
        .route("/_portico/modules/{id}/enable", post(enable_module))
        .route("/_portico/modules/{id}/disable", post(disable_module))
}

/// One composed route, as shown to tooling.
#[derive(Debug, Serialize)]
pub struct RouteInfo {
    pub path: String,
    pub module: String,
    pub title: String,
    pub permissions: Vec<String>,
    pub component: String,
}

async fn list_routes(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> AppResult<Json<Vec<RouteInfo>>> {
    require_admin(&state, &caller)?;
    let snapshot = state.snapshot();
    let routes = snapshot
        .table
        .routes()
        .iter()
        .map(|route| RouteInfo {
            path: route.path().to_string(),
            module: route.module_id().to_string(),
            title: route.title().to_string(),
            permissions: route
                .required_permissions()
                .iter()
                .map(str::to_string)
                .collect(),
            component: route.guarded().describe(),
        })
        .collect();
    Ok(Json(routes))
}

#[derive(Debug, Deserialize)]
struct NavigationQuery {
    path: Option<String>,
}

/// Shell data for the caller.
#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub navigation: Vec<NavItem>,
    pub quick_actions: Vec<QuickActionItem>,
    pub breadcrumb: Option<Breadcrumb>,
}

async fn navigation(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let snapshot = state.snapshot();
    // Same rule as the shell: only an allowed path gets a trail.
    let crumb = query.path.and_then(|path| {
        let decision = snapshot
            .guard
            .decide(NavigationRequest::new(path, Arc::clone(&caller)));
        if decision.is_allowed() {
            breadcrumb(&snapshot.registry, &snapshot.table, decision.path())
        } else {
            None
        }
    });
    Json(NavigationResponse {
        navigation: visible_navigation(&snapshot.registry, &caller),
        quick_actions: visible_quick_actions(&snapshot.registry, &snapshot.table, &caller),
        breadcrumb: crumb,
    })
}

/// Action categories the caller may perform in one module.
#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub module: String,
    pub actions: Vec<String>,
}

async fn module_actions(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> AppResult<Json<ActionsResponse>> {
    let snapshot = state.snapshot();
    let module = snapshot.registry.get(&id).ok_or(AppError::NotFound)?;
    let actions = allowed_actions(module.descriptor(), &caller.held)
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(Json(ActionsResponse {
        module: id,
        actions,
    }))
}

/// 204 if the caller may perform `action`, 403 otherwise.
async fn check_action(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path((id, action)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    let snapshot = state.snapshot();
    let module = snapshot.registry.get(&id).ok_or(AppError::NotFound)?;
    if can_perform(module.descriptor(), &action, &caller.held) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Forbidden)
    }
}

/// Result of a membership change.
#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub module: String,
    pub enabled: bool,
}

async fn enable_module(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> AppResult<Json<MembershipResponse>> {
    set_enabled(&state, &caller, id, true)
}

async fn disable_module(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<String>,
) -> AppResult<Json<MembershipResponse>> {
    set_enabled(&state, &caller, id, false)
}

fn set_enabled(
    state: &AppState,
    caller: &CallerContext,
    id: String,
    enabled: bool,
) -> AppResult<Json<MembershipResponse>> {
    require_admin(state, caller)?;
    if !state.set_module_enabled(&id, enabled)? {
        return Err(AppError::NotFound);
    }
    info!(
        module = %id,
        enabled,
        principal = caller.principal.as_deref().unwrap_or("-"),
        "module membership changed by administrator"
    );
    Ok(Json(MembershipResponse {
        module: id,
        enabled,
    }))
}

fn require_admin(state: &AppState, caller: &CallerContext) -> AppResult<()> {
    if caller.held.contains(&state.config().admin_permission) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
