//! Parser for module `.module.toml` manifest files.
//!
//! Each module directory holds one `{id}.module.toml` declaring:
//! - id, title, order
//! - action permissions (`[permissions]` table)
//! - routes, navigation entries and quick actions
//!
//! Unknown keys are rejected everywhere: a misspelled `permissions` key
//! would otherwise silently turn a gated route into a public one.

use std::collections::BTreeMap;
use std::path::Path;

use portico_sdk::{
    ModuleDescriptor, NavigationEntry, PermissionSet, QuickAction, RouteDeclaration,
};
use serde::Deserialize;

use super::ManifestError;
use super::component::FileComponent;

/// Suffix every manifest file name carries.
pub const MANIFEST_SUFFIX: &str = ".module.toml";

/// Module metadata parsed from `.module.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleManifest {
    /// Module machine name (must match the manifest file name).
    pub id: String,

    /// Human-readable name.
    pub title: String,

    /// Registry precedence (lower first, default 0).
    #[serde(default)]
    pub order: i32,

    /// Action category -> granting tokens.
    #[serde(default)]
    pub permissions: BTreeMap<String, PermissionSet>,

    #[serde(default)]
    pub routes: Vec<RouteManifest>,

    #[serde(default)]
    pub navigation: Vec<NavigationEntry>,

    #[serde(default)]
    pub quick_actions: Vec<QuickAction>,
}

/// One `[[routes]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    pub path: String,
    #[serde(default)]
    pub title: String,
    /// View fragment path, relative to the module directory.
    pub component: String,
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl ModuleManifest {
    /// Parse a manifest file.
    pub fn parse(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::invalid(path.display().to_string(), e.to_string()))?;
        Self::parse_str(&content, path)
    }

    /// Parse manifest content; `path` is used for messages and to check
    /// the file name against the declared id.
    pub fn parse_str(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let manifest: ModuleManifest = toml::from_str(content)
            .map_err(|e| ManifestError::invalid(path.display().to_string(), e.to_string()))?;

        let expected = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(MANIFEST_SUFFIX));
        if let Some(expected) = expected
            && expected != manifest.id
        {
            return Err(ManifestError::IdMismatch {
                path: path.display().to_string(),
                id: manifest.id,
                expected: expected.to_string(),
            });
        }

        Ok(manifest)
    }

    /// Build the module descriptor, resolving components against
    /// `module_dir`.
    pub fn into_descriptor(self, module_dir: &Path) -> Result<ModuleDescriptor, ManifestError> {
        let mut descriptor = ModuleDescriptor::new(self.id, self.title).order(self.order);

        for route in self.routes {
            let component = FileComponent::new(&descriptor.id, module_dir, &route.component)?;
            descriptor = descriptor.route(
                RouteDeclaration::new(route.path, std::sync::Arc::new(component))
                    .title(route.title)
                    .permissions(route.permissions),
            );
        }

        descriptor.navigation = self.navigation;
        descriptor.permissions = self.permissions;
        descriptor.quick_actions = self.quick_actions;
        Ok(descriptor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const EMAIL: &str = r#"
id = "email"
title = "Email"
order = 10

[permissions]
view = ["EMAIL_ADMIN", "EMAIL_USER"]
send = ["EMAIL_USER"]

[[routes]]
path = "/email"
title = "Inbox"
component = "views/inbox.html"
permissions = ["EMAIL_ADMIN", "EMAIL_USER"]

[[routes]]
path = "/email/:id"
component = "views/message.html"
permissions = ["EMAIL_USER"]

[[navigation]]
path = "/email"
label = "Email"
icon = "mail"
permissions = ["EMAIL_ADMIN", "EMAIL_USER"]

[[quick_actions]]
path = "/email/compose"
label = "Compose"
"#;

    fn path() -> &'static Path {
        Path::new("modules/email/email.module.toml")
    }

    #[test]
    fn parses_full_manifest() {
        let manifest = ModuleManifest::parse_str(EMAIL, path()).unwrap();
        assert_eq!(manifest.id, "email");
        assert_eq!(manifest.order, 10);
        assert_eq!(manifest.routes.len(), 2);
        assert_eq!(manifest.routes[1].title, "");
        assert!(manifest.permissions["send"].contains("EMAIL_USER"));
        assert_eq!(manifest.navigation[0].icon.as_deref(), Some("mail"));
        assert_eq!(manifest.quick_actions[0].label, "Compose");
    }

    #[test]
    fn builds_descriptor() {
        let descriptor = ModuleManifest::parse_str(EMAIL, path())
            .unwrap()
            .into_descriptor(Path::new("modules/email"))
            .unwrap();
        assert_eq!(descriptor.routes.len(), 2);
        assert_eq!(descriptor.routes[0].title, "Inbox");
        assert_eq!(
            descriptor.routes[0].component.describe(),
            "email:views/inbox.html"
        );
        assert_eq!(descriptor.navigation.len(), 1);
        assert_eq!(descriptor.quick_actions.len(), 1);
        assert_eq!(descriptor.permissions.len(), 2);
    }

    #[test]
    fn missing_permissions_is_public() {
        let content = r#"
id = "help"
title = "Help"

[[routes]]
path = "/help"
component = "views/help.html"
"#;
        let manifest =
            ModuleManifest::parse_str(content, Path::new("help.module.toml")).unwrap();
        assert!(manifest.routes[0].permissions.is_empty());
        assert_eq!(manifest.order, 0);
    }

    #[test]
    fn rejects_misspelled_permission_key() {
        let content = r#"
id = "help"
title = "Help"

[[routes]]
path = "/help"
component = "views/help.html"
permission = ["ADMIN"]
"#;
        let err = ModuleManifest::parse_str(content, Path::new("help.module.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidManifest { .. }));
        assert!(err.to_string().contains("permission"));
    }

    #[test]
    fn rejects_non_list_permissions() {
        let content = r#"
id = "help"
title = "Help"

[[routes]]
path = "/help"
component = "views/help.html"
permissions = "ADMIN"
"#;
        assert!(ModuleManifest::parse_str(content, Path::new("help.module.toml")).is_err());
    }

    #[test]
    fn rejects_id_not_matching_file_name() {
        let err = ModuleManifest::parse_str(EMAIL, Path::new("mail.module.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::IdMismatch { .. }));
    }

    #[test]
    fn rejects_component_outside_module() {
        let content = r#"
id = "help"
title = "Help"

[[routes]]
path = "/help"
component = "../email/views/inbox.html"
"#;
        let err = ModuleManifest::parse_str(content, Path::new("help.module.toml"))
            .unwrap()
            .into_descriptor(Path::new("modules/help"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::UnsafeComponent { .. }));
    }
}
