#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Access guard tests: OR semantics, public routes, deny-before-load and
//! caller context replacement.

mod common;

use portico_kernel::caller::{CallerContext, SessionContext};
use portico_kernel::permissions::is_authorized;
use portico_kernel::routing::{
    AccessGuard, GuardDecision, NavigationOutcome, NavigationRequest, Navigator,
};
use portico_sdk::{ModuleDescriptor, PermissionSet};
use portico_test_utils::{CountingLoader, FailingLoader, GatedLoader, component, route};

use common::{caller, table};

#[test]
fn test_any_listed_token_is_enough() {
    let required = PermissionSet::from(["EMAIL_ADMIN", "EMAIL_USER"]);
    assert!(is_authorized(&required, &PermissionSet::from(["EMAIL_USER"])));
    assert!(is_authorized(&required, &PermissionSet::from(["EMAIL_ADMIN"])));
    assert!(!is_authorized(&required, &PermissionSet::from(["MANAGER"])));
    assert!(!is_authorized(&required, &PermissionSet::new()));
}

#[test]
fn test_admin_token_has_no_implied_rights() {
    let required = PermissionSet::from(["EMAIL_USER"]);
    assert!(!is_authorized(&required, &PermissionSet::from(["ADMIN"])));
}

#[test]
fn test_public_route_reachable_without_permissions() {
    let loader = CountingLoader::new("help", "<p>help</p>");
    let (_, table) = table(vec![
        ModuleDescriptor::new("help", "Help").route(route("/help", component(&loader), [])),
    ]);
    let guard = AccessGuard::new(table);

    let decision = guard.decide(NavigationRequest::new("/help", caller([])));
    assert!(decision.is_allowed());
    assert_eq!(loader.calls(), 0, "deciding must not load");
}

#[tokio::test]
async fn test_denied_route_never_loads() {
    let loader = CountingLoader::new("billing", "<p>invoices</p>");
    let (_, table) = table(vec![ModuleDescriptor::new("billing", "Billing").route(route(
        "/billing",
        component(&loader),
        ["BILLING_ADMIN"],
    ))]);
    let navigator = Navigator::new(
        table,
        SessionContext::new(CallerContext::new(PermissionSet::from(["EMAIL_USER"]))),
    );

    for _ in 0..3 {
        let outcome = navigator.navigate("/billing").await;
        assert!(matches!(outcome, NavigationOutcome::Forbidden { .. }));
    }
    assert_eq!(loader.calls(), 0);

    navigator
        .session()
        .replace(CallerContext::new(PermissionSet::from(["BILLING_ADMIN"])));
    let outcome = navigator.navigate("/billing").await;
    assert!(matches!(outcome, NavigationOutcome::Rendered(_)));
    assert_eq!(loader.calls(), 1);
}

#[test]
fn test_denied_failing_route_is_forbidden_not_load_failure() {
    let loader = FailingLoader::new("broken");
    let (_, table) = table(vec![ModuleDescriptor::new("ops", "Ops").route(route(
        "/ops",
        component(&loader),
        ["OPS"],
    ))]);
    let guard = AccessGuard::new(table);

    let denied = guard.decide(NavigationRequest::new("/ops", caller([])));
    assert!(matches!(denied, GuardDecision::Denied { .. }));
    assert_eq!(loader.calls(), 0);
}

#[test]
fn test_decision_survives_context_replacement() {
    let loader = CountingLoader::new("email", "<p>inbox</p>");
    let (_, table) = table(vec![ModuleDescriptor::new("email", "Email").route(route(
        "/email",
        component(&loader),
        ["EMAIL_USER"],
    ))]);
    let session = SessionContext::new(CallerContext::new(PermissionSet::from(["EMAIL_USER"])));
    let navigator = Navigator::new(table, session.clone());

    let first = navigator.begin("/email");
    assert!(first.decision().is_allowed());

    // Revocation after the decision was returned.
    session.replace(CallerContext::anonymous());

    assert!(first.decision().is_allowed());
    let second = navigator.begin("/email");
    assert!(matches!(second.decision(), GuardDecision::Denied { .. }));
    assert_eq!(loader.calls(), 0);
}

#[tokio::test]
async fn test_in_flight_load_completes_after_revocation() {
    let loader = GatedLoader::new("email", "<p>inbox</p>");
    let (_, table) = table(vec![ModuleDescriptor::new("email", "Email").route(route(
        "/email",
        component(&loader),
        ["EMAIL_USER"],
    ))]);
    let session = SessionContext::new(CallerContext::new(PermissionSet::from(["EMAIL_USER"])));
    let navigator = Navigator::new(table, session.clone());

    let navigation = navigator.begin("/email");
    let task = tokio::spawn(navigation.finish());

    loader.wait_started().await;
    session.replace(CallerContext::anonymous());
    loader.release();

    let outcome = task.await.unwrap();
    assert!(matches!(outcome, NavigationOutcome::Rendered(_)));

    let next = navigator.navigate("/email").await;
    assert!(matches!(next, NavigationOutcome::Forbidden { .. }));
    assert_eq!(loader.calls(), 1);
}
