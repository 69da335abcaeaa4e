//! Portico test utilities.
//!
//! Instrumented component loaders and descriptor fixtures for exercising
//! the registry, guard and loading boundary without touching the disk.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use portico_sdk::{
    ComponentLoader, ComponentRef, LoadError, ModuleDescriptor, NavigationEntry, PermissionSet,
    RouteDeclaration, View,
};
use tokio::sync::Notify;

/// A loader that counts how often it is asked to load.
///
/// The count is the observable for "a denied navigation never loads".
#[derive(Debug)]
pub struct CountingLoader {
    name: String,
    body: String,
    calls: AtomicUsize,
}

impl CountingLoader {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            body: body.into(),
            calls: AtomicUsize::new(0),
        })
    }

    /// Number of `load` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentLoader for CountingLoader {
    async fn load(&self) -> Result<View, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(View::new(self.body.clone()))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A loader that always fails.
#[derive(Debug)]
pub struct FailingLoader {
    name: String,
    calls: AtomicUsize,
}

impl FailingLoader {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentLoader for FailingLoader {
    async fn load(&self) -> Result<View, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LoadError::failed(&self.name, "fixture failure"))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A loader that blocks until [`GatedLoader::release`] is called.
///
/// Used to hold a navigation in the loading state while the test
/// supersedes it or swaps the caller context.
#[derive(Debug)]
pub struct GatedLoader {
    name: String,
    body: String,
    gate: Notify,
    started: Notify,
    calls: AtomicUsize,
}

impl GatedLoader {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            body: body.into(),
            gate: Notify::new(),
            started: Notify::new(),
            calls: AtomicUsize::new(0),
        })
    }

    /// Let one pending (or the next) load complete.
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until a load has started.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentLoader for GatedLoader {
    async fn load(&self) -> Result<View, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.gate.notified().await;
        Ok(View::new(self.body.clone()))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// A loader that sleeps before answering. Pair with paused tokio time.
#[derive(Debug)]
pub struct SlowLoader {
    name: String,
    delay: Duration,
}

impl SlowLoader {
    pub fn new(name: impl Into<String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            delay,
        })
    }
}

#[async_trait]
impl ComponentLoader for SlowLoader {
    async fn load(&self) -> Result<View, LoadError> {
        tokio::time::sleep(self.delay).await;
        Ok(View::new(format!("<p>{}</p>", self.name)))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Upcast a concrete loader to a [`ComponentRef`].
pub fn component<L: ComponentLoader + 'static>(loader: &Arc<L>) -> ComponentRef {
    Arc::clone(loader) as ComponentRef
}

/// A route gated on `permissions` (empty = public).
pub fn route<const N: usize>(
    path: &str,
    loader: ComponentRef,
    permissions: [&str; N],
) -> RouteDeclaration {
    RouteDeclaration::new(path, loader).permissions(PermissionSet::from(permissions))
}

/// A module with one route and a matching navigation entry, both gated on
/// the same tokens.
pub fn simple_module<const N: usize>(
    id: &str,
    path: &str,
    loader: ComponentRef,
    permissions: [&str; N],
) -> ModuleDescriptor {
    ModuleDescriptor::new(id, capitalize(id))
        .route(route(path, loader, permissions).title(capitalize(id)))
        .nav(
            NavigationEntry::new(path, capitalize(id))
                .permissions(PermissionSet::from(permissions)),
        )
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
