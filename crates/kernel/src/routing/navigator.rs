//! Navigator - runs navigations for one session.
//!
//! Each navigation snapshots the caller context once, is decided by the
//! access guard, and only then (if allowed) enters the loading boundary.
//! Starting a new navigation cancels the previous one's in-flight load so
//! a slow page can never replace the page the user moved on to.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use portico_sdk::{LoadError, View};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::boundary::{LoadOutcome, PendingLoad};
use super::compose::{ComposedRoute, RouteTable};
use super::guard::{AccessGuard, GuardDecision, NavigationRequest};
use crate::caller::{CallerContext, SessionContext};
use crate::registry::RouteParams;

/// A successfully rendered navigation.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub path: String,
    pub route: Arc<ComposedRoute>,
    pub params: RouteParams,
    pub view: View,
}

/// Final result of a navigation.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    Rendered(RenderedPage),
    NotFound { path: String },
    Forbidden { path: String },
    /// Authorized, but the component could not be resolved.
    LoadFailed { path: String, error: LoadError },
    /// Superseded by a later navigation before the load finished.
    Abandoned { path: String },
}

impl NavigationOutcome {
    pub fn path(&self) -> &str {
        match self {
            Self::Rendered(page) => &page.path,
            Self::NotFound { path }
            | Self::Forbidden { path }
            | Self::LoadFailed { path, .. }
            | Self::Abandoned { path } => path,
        }
    }

    /// Short outcome label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rendered(_) => "rendered",
            Self::NotFound { .. } => "not_found",
            Self::Forbidden { .. } => "forbidden",
            Self::LoadFailed { .. } => "load_failed",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}

/// A decided navigation that has not loaded anything yet.
#[derive(Debug)]
pub struct Navigation {
    decision: GuardDecision,
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl Navigation {
    /// Decide a navigation without a session: used by request-scoped
    /// callers such as the HTTP shell.
    pub fn start(
        guard: &AccessGuard,
        request: NavigationRequest,
        cancel: CancellationToken,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            decision: guard.decide(request),
            cancel,
            timeout,
        }
    }

    /// The guard's verdict, available before any load begins.
    pub fn decision(&self) -> &GuardDecision {
        &self.decision
    }

    /// Split into a pending load (allowed) or a terminal outcome
    /// (not found / forbidden). Denied navigations never produce a
    /// [`PendingLoad`].
    pub fn into_pending(self) -> Result<(PendingPage, PendingLoad), NavigationOutcome> {
        match self.decision {
            GuardDecision::NotFound { path } => Err(NavigationOutcome::NotFound { path }),
            GuardDecision::Denied { path, .. } => Err(NavigationOutcome::Forbidden { path }),
            GuardDecision::Allowed {
                path,
                route,
                params,
                component,
            } => {
                let pending = component.begin(self.cancel, self.timeout);
                Ok((
                    PendingPage {
                        path,
                        route,
                        params,
                    },
                    pending,
                ))
            }
        }
    }

    /// Run the navigation to completion.
    pub async fn finish(self) -> NavigationOutcome {
        let (page, mut pending) = match self.into_pending() {
            Ok(parts) => parts,
            Err(outcome) => return outcome,
        };
        let outcome = page.complete(pending.resolve().await);
        debug!(path = %outcome.path(), outcome = outcome.kind(), "navigation finished");
        outcome
    }
}

/// Route context of an allowed navigation whose component is loading.
#[derive(Debug, Clone)]
pub struct PendingPage {
    pub path: String,
    pub route: Arc<ComposedRoute>,
    pub params: RouteParams,
}

impl PendingPage {
    /// Combine with the load result.
    pub fn complete(self, load: LoadOutcome) -> NavigationOutcome {
        match load {
            LoadOutcome::Resolved(view) => NavigationOutcome::Rendered(RenderedPage {
                path: self.path,
                route: self.route,
                params: self.params,
                view,
            }),
            LoadOutcome::Failed(error) => NavigationOutcome::LoadFailed {
                path: self.path,
                error,
            },
            LoadOutcome::Abandoned => NavigationOutcome::Abandoned { path: self.path },
        }
    }
}

/// Session-bound navigator.
#[derive(Debug)]
pub struct Navigator {
    guard: AccessGuard,
    session: SessionContext,
    in_flight: Mutex<Option<CancellationToken>>,
    load_timeout: Option<Duration>,
}

impl Navigator {
    pub fn new(table: Arc<RouteTable>, session: SessionContext) -> Self {
        Self {
            guard: AccessGuard::new(table),
            session,
            in_flight: Mutex::new(None),
            load_timeout: None,
        }
    }

    /// Bound every component load by `timeout`.
    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Begin a navigation: cancel the previous one, snapshot the caller and
    /// decide. Nothing is loaded until the returned [`Navigation`] is
    /// finished.
    pub fn begin(&self, path: &str) -> Navigation {
        let cancel = CancellationToken::new();
        if let Some(previous) = self.in_flight.lock().replace(cancel.clone()) {
            previous.cancel();
        }

        let caller: Arc<CallerContext> = self.session.snapshot();
        Navigation::start(
            &self.guard,
            NavigationRequest::new(path, caller),
            cancel,
            self.load_timeout,
        )
    }

    /// Navigate to `path` and wait for the outcome.
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        self.begin(path).finish().await
    }
}
