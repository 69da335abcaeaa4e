//! Access guard - decides each navigation before anything is loaded.
//!
//! A [`NavigationRequest`] is a navigation in the pending-auth state: a
//! path plus the caller context snapshot taken when the navigation began.
//! [`AccessGuard::decide`] consumes it and yields exactly one of
//! not-found, denied or allowed. Deciding is synchronous; only an allowed
//! decision carries the [`LazyComponent`] needed to start a load.

use std::sync::Arc;

use tracing::{debug, info};

use super::boundary::LazyComponent;
use super::compose::{ComposedRoute, RouteTable};
use crate::caller::CallerContext;
use crate::registry::RouteParams;

/// A navigation awaiting its authorization decision.
#[derive(Debug, Clone)]
pub struct NavigationRequest {
    pub path: String,
    pub caller: Arc<CallerContext>,
}

impl NavigationRequest {
    pub fn new(path: impl Into<String>, caller: Arc<CallerContext>) -> Self {
        Self {
            path: path.into(),
            caller,
        }
    }
}

/// The guard's verdict for one navigation.
#[derive(Debug, Clone)]
pub enum GuardDecision {
    /// No route matches the path.
    NotFound { path: String },
    /// A route matches but the caller holds none of its tokens.
    Denied {
        path: String,
        route: Arc<ComposedRoute>,
    },
    /// The caller may proceed to the route's loading boundary.
    Allowed {
        path: String,
        route: Arc<ComposedRoute>,
        params: RouteParams,
        component: LazyComponent,
    },
}

impl GuardDecision {
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path } | Self::Denied { path, .. } | Self::Allowed { path, .. } => {
                path
            }
        }
    }

    /// The matched route, if any.
    pub fn route(&self) -> Option<&Arc<ComposedRoute>> {
        match self {
            Self::NotFound { .. } => None,
            Self::Denied { route, .. } | Self::Allowed { route, .. } => Some(route),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Checks navigations against a route table.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    table: Arc<RouteTable>,
}

impl AccessGuard {
    pub fn new(table: Arc<RouteTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    /// Resolve the request's path and evaluate the caller against the first
    /// matching route.
    pub fn decide(&self, request: NavigationRequest) -> GuardDecision {
        let NavigationRequest { path, caller } = request;

        let Some((route, params)) = self.table.resolve(&path) else {
            debug!(path = %path, "navigation matched no route");
            return GuardDecision::NotFound { path };
        };

        match route.guarded().authorize(&caller) {
            Some(component) => {
                debug!(
                    path = %path,
                    route = %route.path(),
                    module = %route.module_id(),
                    "navigation allowed"
                );
                GuardDecision::Allowed {
                    component: component.clone(),
                    route: Arc::clone(route),
                    params,
                    path,
                }
            }
            None => {
                info!(
                    path = %path,
                    route = %route.path(),
                    module = %route.module_id(),
                    principal = caller.principal.as_deref().unwrap_or("-"),
                    "navigation denied"
                );
                GuardDecision::Denied {
                    route: Arc::clone(route),
                    path,
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry::ModuleRegistry;
    use crate::routing::compose;
    use portico_sdk::{ModuleDescriptor, RouteDeclaration, StaticComponent};

    fn guard() -> AccessGuard {
        let registry = ModuleRegistry::register(vec![
            ModuleDescriptor::new("billing", "Billing")
                .route(
                    RouteDeclaration::new(
                        "/billing/:invoice",
                        StaticComponent::new("invoice", "").into_ref(),
                    )
                    .permissions(["BILLING_ADMIN", "ACCOUNTANT"]),
                )
                .route(RouteDeclaration::new(
                    "/billing/help",
                    StaticComponent::new("help", "").into_ref(),
                )),
        ])
        .unwrap();
        AccessGuard::new(Arc::new(compose(&registry)))
    }

    fn request(path: &str, held: &[&str]) -> NavigationRequest {
        NavigationRequest::new(
            path,
            Arc::new(CallerContext::new(
                held.iter().copied().collect::<portico_sdk::PermissionSet>(),
            )),
        )
    }

    #[test]
    fn not_found_is_distinct_from_denied() {
        let guard = guard();
        assert!(matches!(
            guard.decide(request("/payroll", &[])),
            GuardDecision::NotFound { .. }
        ));
        assert!(matches!(
            guard.decide(request("/billing/42", &[])),
            GuardDecision::Denied { .. }
        ));
    }

    #[test]
    fn allowed_carries_params_and_route() {
        let decision = guard().decide(request("/billing/42", &["ACCOUNTANT"]));
        let GuardDecision::Allowed { route, params, .. } = &decision else {
            panic!("expected allowed, got {decision:?}");
        };
        assert_eq!(route.module_id(), "billing");
        assert_eq!(params.get("invoice").map(String::as_str), Some("42"));
        assert!(decision.is_allowed());
    }

    #[test]
    fn first_match_wins_within_a_module() {
        // "/billing/:invoice" is declared first and swallows "/billing/help".
        let decision = guard().decide(request("/billing/help", &[]));
        assert!(matches!(decision, GuardDecision::Denied { .. }));
        assert_eq!(decision.route().unwrap().path(), "/billing/:invoice");
    }

    #[test]
    fn decision_reports_requested_path() {
        let decision = guard().decide(request("/billing/7/", &["BILLING_ADMIN"]));
        assert_eq!(decision.path(), "/billing/7/");
        assert!(decision.is_allowed());
    }
}
