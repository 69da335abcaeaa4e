//! Module registry - the single source of truth for which routes and
//! navigation entries exist.
//!
//! A registry is built once from a list of [`ModuleDescriptor`]s and never
//! changes afterwards. Enabling or disabling a module produces a new
//! registry; holders of the old one keep a consistent view.
//!
//! Ordering: modules are sorted by `order` ascending. Ties keep the order
//! in which descriptors were passed to [`ModuleRegistry::register`]. This
//! order decides which route wins when patterns overlap.

mod error;
pub mod pattern;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use portico_sdk::{ModuleDescriptor, PermissionSet, RouteDeclaration};
use tracing::{debug, error, info, warn};

pub use error::{ConfigIssue, Diagnostic, RegistryError};
pub use pattern::{PatternError, RouteParams, RoutePattern};

/// First path segment of the kernel's JSON endpoints.
pub const KERNEL_PREFIX: &str = "_portico";

/// Endpoints the kernel router serves before any module route is tried.
/// Keep in step with `routes::health` and `routes::api`.
pub const KERNEL_ENDPOINTS: &[&str] = &[
    "/health",
    "/_portico/routes",
    "/_portico/navigation",
    "/_portico/modules/:id/actions",
    "/_portico/modules/:id/actions/:action",
    "/_portico/modules/:id/enable",
    "/_portico/modules/:id/disable",
];

fn kernel_endpoints() -> impl Iterator<Item = RoutePattern> {
    KERNEL_ENDPOINTS
        .iter()
        .filter_map(|raw| RoutePattern::parse(raw).ok())
}

/// The kernel endpoint that always answers for `pattern`, if any.
fn reserved_by(pattern: &RoutePattern) -> Option<String> {
    if pattern.starts_with(KERNEL_PREFIX) {
        return Some(format!("/{KERNEL_PREFIX}"));
    }
    kernel_endpoints()
        .find(|endpoint| endpoint.covers(pattern))
        .map(|endpoint| endpoint.to_string())
}

/// A validated module with its parsed route patterns.
#[derive(Debug, Clone)]
pub struct RegisteredModule {
    descriptor: ModuleDescriptor,
    /// Parsed `descriptor.routes[i].path`, same indices.
    patterns: Vec<RoutePattern>,
}

impl RegisteredModule {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Routes paired with their parsed patterns, in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = (&RoutePattern, &RouteDeclaration)> {
        self.patterns.iter().zip(&self.descriptor.routes)
    }
}

/// Immutable, ordered snapshot of registered modules.
///
/// Cheap to clone; clones share the same snapshot.
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    inner: Arc<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    modules: Vec<RegisteredModule>,
    diagnostics: Vec<Diagnostic>,
}

impl ModuleRegistry {
    /// Validate and order descriptors into a registry.
    ///
    /// Collects every configuration error before failing so a broken
    /// deployment can be fixed in one pass. Warnings do not fail
    /// registration; they are logged and available via [`diagnostics`].
    ///
    /// [`diagnostics`]: ModuleRegistry::diagnostics
    pub fn register(descriptors: Vec<ModuleDescriptor>) -> Result<Self, RegistryError> {
        let mut issues = Vec::new();
        let mut modules = Vec::with_capacity(descriptors.len());
        let mut seen_ids: HashSet<String> = HashSet::new();

        for (position, descriptor) in descriptors.into_iter().enumerate() {
            if descriptor.id.trim().is_empty() {
                issues.push(ConfigIssue::EmptyModuleId { position });
            } else if !seen_ids.insert(descriptor.id.clone()) {
                issues.push(ConfigIssue::DuplicateModuleId {
                    id: descriptor.id.clone(),
                });
            }

            let patterns = validate_descriptor(&descriptor, &mut issues);
            modules.push(RegisteredModule {
                descriptor,
                patterns,
            });
        }

        // Stable sort: equal `order` keeps input position.
        modules.sort_by_key(|m| m.descriptor.order);

        check_duplicate_paths(&modules, &mut issues);

        if !issues.is_empty() {
            for issue in &issues {
                error!(issue = %issue, "module configuration error");
            }
            return Err(RegistryError { issues });
        }

        let diagnostics = collect_diagnostics(&modules);
        for diagnostic in &diagnostics {
            warn!(diagnostic = %diagnostic, "module configuration warning");
        }

        info!(
            modules = modules.len(),
            routes = modules.iter().map(|m| m.patterns.len()).sum::<usize>(),
            warnings = diagnostics.len(),
            "module registry built"
        );

        Ok(Self {
            inner: Arc::new(RegistryInner {
                modules,
                diagnostics,
            }),
        })
    }

    /// A new registry containing only the modules `keep` accepts.
    ///
    /// Re-registers the surviving descriptors in current registry order, so
    /// relative precedence is unchanged.
    pub fn retain(
        &self,
        keep: impl Fn(&ModuleDescriptor) -> bool,
    ) -> Result<Self, RegistryError> {
        let descriptors = self
            .inner
            .modules
            .iter()
            .map(|m| &m.descriptor)
            .filter(|d| keep(*d))
            .cloned()
            .collect();
        Self::register(descriptors)
    }

    /// Modules in registry order.
    pub fn modules(&self) -> &[RegisteredModule] {
        &self.inner.modules
    }

    /// Look up a module by id.
    pub fn get(&self, id: &str) -> Option<&RegisteredModule> {
        self.inner.modules.iter().find(|m| m.id() == id)
    }

    /// Module ids in registry order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.inner.modules.iter().map(RegisteredModule::id)
    }

    /// Warnings found during registration.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.inner.diagnostics
    }

    pub fn len(&self) -> usize {
        self.inner.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.modules.is_empty()
    }

    /// Whether two handles refer to the same snapshot.
    pub fn same_snapshot(&self, other: &ModuleRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Validate one descriptor's paths and permission sets, returning the
/// parsed route patterns that were valid.
fn validate_descriptor(
    descriptor: &ModuleDescriptor,
    issues: &mut Vec<ConfigIssue>,
) -> Vec<RoutePattern> {
    let module = descriptor.id.as_str();
    let mut patterns = Vec::with_capacity(descriptor.routes.len());

    for route in &descriptor.routes {
        if let Some(pattern) = check_path(module, "route", &route.path, issues) {
            patterns.push(pattern);
        }
        check_tokens(
            module,
            &format!("route '{}'", route.path),
            &route.required_permissions,
            issues,
        );
    }

    for entry in &descriptor.navigation {
        check_path(module, "navigation", &entry.path, issues);
        check_tokens(
            module,
            &format!("navigation entry '{}'", entry.path),
            &entry.permissions,
            issues,
        );
    }

    for action in &descriptor.quick_actions {
        check_path(module, "quick action", &action.path, issues);
    }

    for (category, tokens) in &descriptor.permissions {
        if category.trim().is_empty() {
            issues.push(ConfigIssue::EmptyActionCategory {
                module: module.to_string(),
            });
        }
        check_tokens(module, &format!("action '{category}'"), tokens, issues);
    }

    patterns
}

/// Parse one declared path, recording malformed and reserved paths.
fn check_path(
    module: &str,
    kind: &'static str,
    path: &str,
    issues: &mut Vec<ConfigIssue>,
) -> Option<RoutePattern> {
    let pattern = match RoutePattern::parse(path) {
        Ok(pattern) => pattern,
        Err(reason) => {
            issues.push(ConfigIssue::MalformedPath {
                module: module.to_string(),
                kind,
                path: path.to_string(),
                reason,
            });
            return None;
        }
    };
    if let Some(reserved) = reserved_by(&pattern) {
        issues.push(ConfigIssue::ReservedPath {
            module: module.to_string(),
            kind,
            path: path.to_string(),
            reserved,
        });
        return None;
    }
    Some(pattern)
}

fn check_tokens(
    module: &str,
    context: &str,
    tokens: &PermissionSet,
    issues: &mut Vec<ConfigIssue>,
) {
    for token in tokens.iter() {
        let malformed =
            token.is_empty() || token.chars().any(|c| c.is_whitespace() || c == ',');
        if malformed {
            issues.push(ConfigIssue::MalformedPermission {
                module: module.to_string(),
                context: context.to_string(),
                token: token.to_string(),
            });
        }
    }
}

/// Identical path strings are an error regardless of which modules declare
/// them; the second could never be reached.
fn check_duplicate_paths(modules: &[RegisteredModule], issues: &mut Vec<ConfigIssue>) {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    for module in modules {
        for pattern in &module.patterns {
            if let Some(first) = owners.get(pattern.as_str()) {
                issues.push(ConfigIssue::DuplicatePath {
                    path: pattern.as_str().to_string(),
                    first: (*first).to_string(),
                    second: module.id().to_string(),
                });
            } else {
                owners.insert(pattern.as_str(), module.id());
            }
        }
    }
}

/// First route (in registry order) whose pattern matches `path`.
fn first_match<'a>(
    modules: &'a [RegisteredModule],
    path: &str,
) -> Option<(&'a RegisteredModule, &'a RouteDeclaration)> {
    modules.iter().find_map(|module| {
        module
            .routes()
            .find(|(pattern, _)| pattern.matches(path).is_some())
            .map(|(_, route)| (module, route))
    })
}

fn collect_diagnostics(modules: &[RegisteredModule]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for module in modules {
        for entry in &module.descriptor.navigation {
            match first_match(modules, &entry.path) {
                Some((_, route)) if route.required_permissions != entry.permissions => {
                    diagnostics.push(Diagnostic::NavigationPermissionMismatch {
                        module: module.id().to_string(),
                        path: entry.path.clone(),
                        navigation: entry.permissions.clone(),
                        route: route.required_permissions.clone(),
                    });
                }
                Some(_) => {}
                None => diagnostics.push(Diagnostic::DanglingNavigation {
                    module: module.id().to_string(),
                    path: entry.path.clone(),
                }),
            }
        }

        for action in &module.descriptor.quick_actions {
            if first_match(modules, &action.path).is_none() {
                diagnostics.push(Diagnostic::DanglingQuickAction {
                    module: module.id().to_string(),
                    path: action.path.clone(),
                });
            }
        }
    }

    for module in modules {
        for pattern in &module.patterns {
            for endpoint in kernel_endpoints().filter(|e| e.overlaps(pattern)) {
                diagnostics.push(Diagnostic::KernelOverlap {
                    module: module.id().to_string(),
                    path: pattern.to_string(),
                    endpoint: endpoint.to_string(),
                });
            }
        }
    }

    // Cross-module overlaps: the earlier module always wins.
    for (i, earlier) in modules.iter().enumerate() {
        for later in &modules[i + 1..] {
            for winner in &earlier.patterns {
                for shadowed in &later.patterns {
                    if winner.as_str() != shadowed.as_str() && winner.overlaps(shadowed) {
                        diagnostics.push(Diagnostic::ShadowedRoute {
                            winner_module: earlier.id().to_string(),
                            winner: winner.to_string(),
                            shadowed_module: later.id().to_string(),
                            shadowed: shadowed.to_string(),
                        });
                    }
                }
            }
        }
    }

    debug!(count = diagnostics.len(), "registry diagnostics collected");
    diagnostics
}
