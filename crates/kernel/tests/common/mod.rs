#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the REAL kernel router and state, either from the demo
//! `modules/` directory at the repository root or from descriptors built
//! in code.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use portico_sdk::{ModuleDescriptor, PermissionSet};
use tower::ServiceExt;

use portico_kernel::caller::CallerContext;
use portico_kernel::config::Config;
use portico_kernel::registry::ModuleRegistry;
use portico_kernel::routes;
use portico_kernel::routing::{RouteTable, compose};
use portico_kernel::state::AppState;

/// The demo modules shipped at the repository root.
pub fn demo_modules_dir() -> PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // project root
        .map(|root| root.join("modules"))
        .unwrap_or_else(|| PathBuf::from("modules"))
}

/// A caller holding exactly `tokens`.
pub fn caller<const N: usize>(tokens: [&str; N]) -> Arc<CallerContext> {
    Arc::new(CallerContext::new(PermissionSet::from(tokens)))
}

/// Register descriptors and compose their route table.
pub fn table(descriptors: Vec<ModuleDescriptor>) -> (ModuleRegistry, Arc<RouteTable>) {
    let registry = ModuleRegistry::register(descriptors).expect("registration failed");
    let table = Arc::new(compose(&registry));
    (registry, table)
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over the demo modules directory.
    pub fn demo() -> Self {
        let config = Config {
            modules_dir: demo_modules_dir(),
            ..Config::default()
        };
        Self::with_state(AppState::new(config).expect("Failed to initialize AppState"))
    }

    /// App over descriptors built in code.
    pub fn from_descriptors(descriptors: Vec<ModuleDescriptor>) -> Self {
        let state = AppState::from_descriptors(Config::default(), descriptors)
            .expect("Failed to initialize AppState");
        Self::with_state(state)
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            router: routes::app(state.clone()),
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a request carrying `permissions` in the permission header.
    pub async fn send(&self, method: Method, uri: &str, permissions: &str) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if !permissions.is_empty() {
            builder = builder.header("x-portico-permissions", permissions);
        }
        let response = self.request(builder.body(Body::empty()).unwrap()).await;
        let status = response.status();
        (status, body_string(response).await)
    }

    pub async fn get(&self, uri: &str, permissions: &str) -> (StatusCode, String) {
        self.send(Method::GET, uri, permissions).await
    }

    pub async fn post(&self, uri: &str, permissions: &str) -> (StatusCode, String) {
        self.send(Method::POST, uri, permissions).await
    }

    pub async fn get_json(&self, uri: &str, permissions: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = self.get(uri, permissions).await;
        let value = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
        (status, value)
    }
}

/// Collect a response body as a UTF-8 string.
pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
