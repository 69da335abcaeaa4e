//! Visible navigation and quick actions.
//!
//! Navigation entries are filtered by their OWN permission sets, not by the
//! permissions of the routes they point at. When a module authors the two
//! differently, a caller can see a link that then answers forbidden (or
//! reach a page that has no link). That gap is reported as a registry
//! warning but deliberately not papered over here.

use serde::Serialize;

use crate::caller::CallerContext;
use crate::permissions::is_authorized;
use crate::registry::ModuleRegistry;
use crate::routing::RouteTable;

/// A menu entry visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub module_id: String,
    pub path: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// A quick action visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickActionItem {
    pub module_id: String,
    pub path: String,
    pub label: String,
}

/// Navigation entries of every module, in registry order, that the
/// caller's permissions satisfy.
pub fn visible_navigation(registry: &ModuleRegistry, caller: &CallerContext) -> Vec<NavItem> {
    registry
        .modules()
        .iter()
        .flat_map(|module| {
            module
                .descriptor()
                .navigation
                .iter()
                .filter(|entry| is_authorized(&entry.permissions, &caller.held))
                .map(move |entry| NavItem {
                    module_id: module.id().to_string(),
                    path: entry.path.clone(),
                    label: entry.label.clone(),
                    icon: entry.icon.clone(),
                })
        })
        .collect()
}

/// Quick actions whose target route would let the caller in.
///
/// Quick actions have no gate of their own; each inherits the guard of the
/// route its path resolves to in `table`. Actions resolving to no route
/// are never shown.
pub fn visible_quick_actions(
    registry: &ModuleRegistry,
    table: &RouteTable,
    caller: &CallerContext,
) -> Vec<QuickActionItem> {
    registry
        .modules()
        .iter()
        .flat_map(|module| {
            module
                .descriptor()
                .quick_actions
                .iter()
                .filter(|action| {
                    table
                        .resolve(&action.path)
                        .is_some_and(|(route, _)| route.guarded().authorize(caller).is_some())
                })
                .map(move |action| QuickActionItem {
                    module_id: module.id().to_string(),
                    path: action.path.clone(),
                    label: action.label.clone(),
                })
        })
        .collect()
}
