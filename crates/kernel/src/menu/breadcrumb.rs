//! Breadcrumb resolution.
//!
//! Breadcrumbs are a single level deep: the owning module, then the current
//! page. Deeper hierarchies are not modelled.

use serde::Serialize;

use crate::registry::ModuleRegistry;
use crate::routing::RouteTable;

/// "Module -> page" trail for the current path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub module_id: String,
    /// Module display name.
    pub module: String,
    /// Current page title.
    pub page: String,
    /// The path the breadcrumb was resolved for.
    pub path: String,
}

/// Resolve the breadcrumb for `path`, using the same first-match rule as
/// the access guard. Returns `None` when no route matches.
///
/// Does not consider the caller: a forbidden page still has a location.
pub fn breadcrumb(registry: &ModuleRegistry, table: &RouteTable, path: &str) -> Option<Breadcrumb> {
    let (route, _) = table.resolve(path)?;
    let module = registry.get(route.module_id())?;

    Some(Breadcrumb {
        module_id: module.id().to_string(),
        module: module.descriptor().title.clone(),
        page: route.title().to_string(),
        path: path.to_string(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::routing::compose;
    use portico_sdk::{ModuleDescriptor, RouteDeclaration, StaticComponent};

    fn registry() -> ModuleRegistry {
        ModuleRegistry::register(vec![
            ModuleDescriptor::new("companies", "Companies")
                .route(
                    RouteDeclaration::new("/companies", StaticComponent::new("list", "").into_ref())
                        .title("All companies"),
                )
                .route(
                    RouteDeclaration::new(
                        "/companies/:id",
                        StaticComponent::new("detail", "").into_ref(),
                    )
                    .title("Company details")
                    .permissions(["COMPANY_VIEW"]),
                ),
        ])
        .unwrap()
    }

    #[test]
    fn module_then_page() {
        let registry = registry();
        let table = compose(&registry);
        let crumb = breadcrumb(&registry, &table, "/companies/12").unwrap();

        assert_eq!(crumb.module, "Companies");
        assert_eq!(crumb.page, "Company details");
        assert_eq!(crumb.module_id, "companies");
        assert_eq!(crumb.path, "/companies/12");
    }

    #[test]
    fn unknown_path_has_no_breadcrumb() {
        let registry = registry();
        let table = compose(&registry);
        assert!(breadcrumb(&registry, &table, "/email").is_none());
    }
}
