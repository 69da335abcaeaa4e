//! Portico Module SDK
//!
//! Types and traits a feature module uses to contribute itself to the
//! Portico kernel: routes, navigation entries, action permissions and quick
//! actions. Modules never depend on one another, only on this crate.

pub mod component;
pub mod permission;
pub mod types;

pub use component::{ComponentLoader, ComponentRef, LoadError, StaticComponent, View};
pub use permission::PermissionSet;
pub use types::{ModuleDescriptor, NavigationEntry, QuickAction, RouteDeclaration};
