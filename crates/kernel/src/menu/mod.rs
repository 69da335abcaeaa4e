//! Navigation surfaces derived from the module registry.
//!
//! Menus, quick actions and breadcrumbs are recomputed from the registry,
//! the route table and the caller on every render. Nothing here mutates
//! state or caches a previous answer.

mod aggregator;
mod breadcrumb;

pub use aggregator::{NavItem, QuickActionItem, visible_navigation, visible_quick_actions};
pub use breadcrumb::{Breadcrumb, breadcrumb};
