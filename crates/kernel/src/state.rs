//! Application state shared across all handlers.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use portico_sdk::ModuleDescriptor;
use tracing::info;

use crate::config::Config;
use crate::manifest::discover_modules;
use crate::registry::{ModuleRegistry, RegistryError};
use crate::routing::{AccessGuard, RouteTable, compose};
use crate::shell::ShellRenderer;

/// One consistent view of the enabled modules and their route table.
///
/// Handlers take a snapshot at the start of a request and use it
/// throughout, so a concurrent enable/disable never changes the table
/// underneath an in-flight navigation.
#[derive(Debug)]
pub struct Snapshot {
    pub registry: ModuleRegistry,
    pub table: Arc<RouteTable>,
    pub guard: AccessGuard,
}

impl Snapshot {
    fn build(registry: ModuleRegistry) -> Self {
        let table = Arc::new(compose(&registry));
        Self {
            guard: AccessGuard::new(Arc::clone(&table)),
            registry,
            table,
        }
    }
}

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,

    /// Every discovered module, validated together at startup.
    available: ModuleRegistry,

    /// Ids currently switched off. Held while rebuilding so membership
    /// changes are applied one at a time.
    disabled: Mutex<BTreeSet<String>>,

    /// Current snapshot. Replaced wholesale, never patched.
    current: RwLock<Arc<Snapshot>>,

    shell: ShellRenderer,
}

impl AppState {
    /// Discover modules from `config.modules_dir` and build the initial
    /// snapshot.
    pub fn new(config: Config) -> Result<Self> {
        let descriptors = discover_modules(&config.modules_dir).with_context(|| {
            format!(
                "failed to load modules from {}",
                config.modules_dir.display()
            )
        })?;
        Self::from_descriptors(config, descriptors)
    }

    /// Build state from descriptors supplied in code.
    pub fn from_descriptors(config: Config, descriptors: Vec<ModuleDescriptor>) -> Result<Self> {
        let available =
            ModuleRegistry::register(descriptors).context("module registration failed")?;

        let disabled: BTreeSet<String> = config.disabled_modules.iter().cloned().collect();
        for id in &disabled {
            if available.get(id).is_none() {
                tracing::warn!(module = %id, "DISABLED_MODULES names an unknown module");
            }
        }

        let enabled = available
            .retain(|d| !disabled.contains(&d.id))
            .context("module registration failed")?;
        let snapshot = Snapshot::build(enabled);

        info!(
            available = available.len(),
            enabled = snapshot.registry.len(),
            routes = snapshot.table.len(),
            "module snapshot ready"
        );

        let shell = ShellRenderer::new().context("failed to initialize shell template")?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                available,
                disabled: Mutex::new(disabled),
                current: RwLock::new(Arc::new(snapshot)),
                shell,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.current.read().clone()
    }

    /// Every discovered module, enabled or not.
    pub fn available(&self) -> &ModuleRegistry {
        &self.inner.available
    }

    pub fn shell(&self) -> &ShellRenderer {
        &self.inner.shell
    }

    /// Whether a module is currently enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.snapshot().registry.get(id).is_some()
    }

    /// Enable or disable a discovered module, rebuilding the snapshot.
    ///
    /// Returns `Ok(false)` if the module is unknown. Navigations already
    /// holding the previous snapshot finish against it.
    pub fn set_module_enabled(&self, id: &str, enabled: bool) -> Result<bool, RegistryError> {
        if self.inner.available.get(id).is_none() {
            return Ok(false);
        }

        let mut disabled = self.inner.disabled.lock();
        // Committed together with the snapshot, or not at all.
        let mut next = disabled.clone();
        let changed = if enabled {
            next.remove(id)
        } else {
            next.insert(id.to_string())
        };
        if !changed {
            return Ok(true);
        }

        let registry = self.inner.available.retain(|d| !next.contains(&d.id))?;
        let snapshot = Arc::new(Snapshot::build(registry));
        *disabled = next;
        *self.inner.current.write() = snapshot;

        info!(module = %id, enabled, "module membership changed; snapshot rebuilt");
        Ok(true)
    }
}
