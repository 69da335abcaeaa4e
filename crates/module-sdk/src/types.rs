//! Module descriptor types.
//!
//! Each feature module produces exactly one [`ModuleDescriptor`]. The kernel
//! validates descriptors when the registry is built and never reaches into a
//! module beyond what is declared here.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::component::ComponentRef;
use crate::permission::PermissionSet;

/// One addressable path within a module.
#[derive(Clone)]
pub struct RouteDeclaration {
    /// URL pattern, e.g. `/companies/:id`.
    pub path: String,
    /// Page title used for the breadcrumb. Empty falls back to the path.
    pub title: String,
    /// Lazily loaded view owned by the module.
    pub component: ComponentRef,
    /// Tokens that grant access. Empty = public.
    pub required_permissions: PermissionSet,
}

impl RouteDeclaration {
    pub fn new(path: impl Into<String>, component: ComponentRef) -> Self {
        Self {
            path: path.into(),
            title: String::new(),
            component,
            required_permissions: PermissionSet::public(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn permissions(mut self, permissions: impl Into<PermissionSet>) -> Self {
        self.required_permissions = permissions.into();
        self
    }
}

impl fmt::Debug for RouteDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDeclaration")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("component", &self.component.describe())
            .field("required_permissions", &self.required_permissions)
            .finish()
    }
}

/// A menu entry pointing at a route path.
///
/// Carries its own permission set, authored separately from the route's.
/// The two are expected to agree but nothing forces them to: a mismatch
/// means a visible link can be forbidden, or a reachable page has no link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavigationEntry {
    pub path: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl NavigationEntry {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            icon: None,
            permissions: PermissionSet::public(),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn permissions(mut self, permissions: impl Into<PermissionSet>) -> Self {
        self.permissions = permissions.into();
        self
    }
}

/// A shortcut to a route. Has no gate of its own: it is shown only when
/// the target route would allow the caller in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuickAction {
    pub path: String,
    pub label: String,
}

impl QuickAction {
    pub fn new(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Declaration of one pluggable feature module.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Stable identifier, unique across the registry.
    pub id: String,
    /// Display name, used as the first breadcrumb level.
    pub title: String,
    /// Iteration precedence (lower first). Ties keep registration order.
    pub order: i32,
    pub routes: Vec<RouteDeclaration>,
    pub navigation: Vec<NavigationEntry>,
    /// Action category (`view`, `create`, `send`, ...) to granting tokens.
    /// Consulted by pages, not by the router.
    pub permissions: BTreeMap<String, PermissionSet>,
    pub quick_actions: Vec<QuickAction>,
}

impl ModuleDescriptor {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order: 0,
            routes: Vec::new(),
            navigation: Vec::new(),
            permissions: BTreeMap::new(),
            quick_actions: Vec::new(),
        }
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn route(mut self, route: RouteDeclaration) -> Self {
        self.routes.push(route);
        self
    }

    pub fn nav(mut self, entry: NavigationEntry) -> Self {
        self.navigation.push(entry);
        self
    }

    pub fn action(
        mut self,
        category: impl Into<String>,
        permissions: impl Into<PermissionSet>,
    ) -> Self {
        self.permissions.insert(category.into(), permissions.into());
        self
    }

    pub fn quick_action(mut self, action: QuickAction) -> Self {
        self.quick_actions.push(action);
        self
    }
}
