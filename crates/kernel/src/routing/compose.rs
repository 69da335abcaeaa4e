//! Route composer - flattens a registry into the route table.
//!
//! Every module's routes are appended in registry order, and each route's
//! component is wrapped twice: the access guard outside, the loading
//! boundary inside. The only way to reach a route's [`LazyComponent`] is
//! through [`GuardedComponent::authorize`], so a denied caller can never
//! start a load.
//!
//! Matching is first-match-wins in table order. When two modules declare
//! overlapping patterns, the module earlier in registry order shadows the
//! later one for every path both match.

use std::sync::Arc;

use portico_sdk::PermissionSet;
use tracing::debug;

use super::boundary::LazyComponent;
use crate::caller::CallerContext;
use crate::permissions::is_authorized;
use crate::registry::{ModuleRegistry, RouteParams, RoutePattern};

/// Access guard layer around a route's lazy component.
#[derive(Debug, Clone)]
pub struct GuardedComponent {
    required: PermissionSet,
    inner: LazyComponent,
}

impl GuardedComponent {
    pub fn required(&self) -> &PermissionSet {
        &self.required
    }

    /// The loading boundary, if the caller passes the gate.
    pub fn authorize(&self, caller: &CallerContext) -> Option<&LazyComponent> {
        is_authorized(&self.required, &caller.held).then_some(&self.inner)
    }

    /// Component name, for listings. Does not load anything.
    pub fn describe(&self) -> String {
        self.inner.describe()
    }
}

impl PartialEq for GuardedComponent {
    fn eq(&self, other: &Self) -> bool {
        self.required == other.required && self.inner.same_component(&other.inner)
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedRoute {
    pattern: RoutePattern,
    module_id: String,
    title: String,
    guarded: GuardedComponent,
}

impl ComposedRoute {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Page title; falls back to the path when the module gave none.
    pub fn title(&self) -> &str {
        if self.title.is_empty() {
            self.pattern.as_str()
        } else {
            &self.title
        }
    }

    pub fn required_permissions(&self) -> &PermissionSet {
        self.guarded.required()
    }

    pub fn guarded(&self) -> &GuardedComponent {
        &self.guarded
    }
}

/// Ordered, immutable route table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTable {
    routes: Vec<Arc<ComposedRoute>>,
}

impl RouteTable {
    /// Routes in match order.
    pub fn routes(&self) -> &[Arc<ComposedRoute>] {
        &self.routes
    }

    /// First route matching `path`, with its captured parameters.
    pub fn resolve(&self, path: &str) -> Option<(&Arc<ComposedRoute>, RouteParams)> {
        self.routes
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Compose the route table for a registry snapshot.
///
/// Deterministic: composing the same snapshot twice yields equal tables.
pub fn compose(registry: &ModuleRegistry) -> RouteTable {
    let routes: Vec<Arc<ComposedRoute>> = registry
        .modules()
        .iter()
        .flat_map(|module| {
            module.routes().map(move |(pattern, route)| {
                Arc::new(ComposedRoute {
                    pattern: pattern.clone(),
                    module_id: module.id().to_string(),
                    title: route.title.clone(),
                    guarded: GuardedComponent {
                        required: route.required_permissions.clone(),
                        inner: LazyComponent::new(route.component.clone()),
                    },
                })
            })
        })
        .collect();

    debug!(routes = routes.len(), "composed route table");
    RouteTable { routes }
}
