#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Navigation aggregation tests.

mod common;

use portico_kernel::menu::{breadcrumb, visible_navigation, visible_quick_actions};
use portico_kernel::registry::Diagnostic;
use portico_kernel::routing::{AccessGuard, GuardDecision, NavigationRequest};
use portico_sdk::{ModuleDescriptor, NavigationEntry, PermissionSet, QuickAction};
use portico_test_utils::{CountingLoader, component, route, simple_module};

use common::{caller, table};

/// A nav entry visible to MANAGER pointing at a route only EMAIL_USER may
/// open. The link is shown and the navigation is then denied.
#[test]
fn test_link_shown_for_route_that_denies() {
    let inbox = CountingLoader::new("inbox", "inbox");
    let (registry, table) = table(vec![
        ModuleDescriptor::new("email", "Email")
            .route(route("/email", component(&inbox), ["EMAIL_USER"]))
            .nav(
                NavigationEntry::new("/email", "Email")
                    .permissions(PermissionSet::from(["EMAIL_USER", "MANAGER"])),
            ),
    ]);

    let manager = caller(["MANAGER"]);
    let nav = visible_navigation(&registry, &manager);
    assert_eq!(nav.len(), 1);
    assert_eq!(nav[0].path, "/email");

    let guard = AccessGuard::new(table);
    let decision = guard.decide(NavigationRequest::new("/email", manager));
    assert!(matches!(decision, GuardDecision::Denied { .. }));
    assert_eq!(inbox.calls(), 0);

    assert!(matches!(
        registry.diagnostics(),
        [Diagnostic::NavigationPermissionMismatch { .. }]
    ));
}

/// The reverse gap: a reachable route whose link is hidden.
#[test]
fn test_hidden_link_does_not_block_route() {
    let inbox = CountingLoader::new("inbox", "inbox");
    let (registry, table) = table(vec![
        ModuleDescriptor::new("email", "Email")
            .route(route("/email", component(&inbox), []))
            .nav(
                NavigationEntry::new("/email", "Email")
                    .permissions(PermissionSet::from(["EMAIL_ADMIN"])),
            ),
    ]);

    let anonymous = caller([]);
    assert!(visible_navigation(&registry, &anonymous).is_empty());

    let guard = AccessGuard::new(table);
    assert!(
        guard
            .decide(NavigationRequest::new("/email", anonymous))
            .is_allowed()
    );
}

#[test]
fn test_navigation_follows_registry_order() {
    let loader = CountingLoader::new("x", "x");
    let (registry, _) = table(vec![
        simple_module("phone", "/phone", component(&loader), []).order(2),
        simple_module("email", "/email", component(&loader), []).order(1),
        simple_module("billing", "/billing", component(&loader), ["BILLING_ADMIN"]).order(3),
    ]);

    let labels: Vec<_> = visible_navigation(&registry, &caller([]))
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(labels, vec!["Email", "Phone"]);

    let labels: Vec<_> = visible_navigation(&registry, &caller(["BILLING_ADMIN"]))
        .into_iter()
        .map(|item| item.label)
        .collect();
    assert_eq!(labels, vec!["Email", "Phone", "Billing"]);
}

#[test]
fn test_quick_actions_follow_target_route() {
    let loader = CountingLoader::new("x", "x");
    let (registry, table) = table(vec![
        ModuleDescriptor::new("clients", "Clients")
            .route(route("/clients", component(&loader), ["CLIENTS_USER", "MANAGER"]))
            .route(route("/clients/new", component(&loader), ["MANAGER"]))
            .quick_action(QuickAction::new("/clients/new", "Add client"))
            .quick_action(QuickAction::new("/clients", "All clients")),
    ]);

    let user = visible_quick_actions(&registry, &table, &caller(["CLIENTS_USER"]));
    assert_eq!(user.len(), 1);
    assert_eq!(user[0].label, "All clients");

    let manager = visible_quick_actions(&registry, &table, &caller(["MANAGER"]));
    assert_eq!(manager.len(), 2);
    assert_eq!(manager[0].module_id, "clients");
}

#[test]
fn test_breadcrumb_names_module_and_page() {
    let loader = CountingLoader::new("x", "x");
    let (registry, table) = table(vec![
        ModuleDescriptor::new("phone", "Phone").route(
            route("/phone/calls/:id", component(&loader), ["PHONE_USER"]).title("Call details"),
        ),
    ]);

    let crumb = breadcrumb(&registry, &table, "/phone/calls/42").unwrap();
    assert_eq!(crumb.module, "Phone");
    assert_eq!(crumb.page, "Call details");
    assert_eq!(crumb.path, "/phone/calls/42");

    assert!(breadcrumb(&registry, &table, "/phone/calls").is_none());
}
