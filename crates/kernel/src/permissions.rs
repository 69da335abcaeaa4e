//! Permission evaluation.
//!
//! A required set is satisfied by holding ANY one of its tokens, not all of
//! them: a route's permission set lists every role that should see it. An
//! empty required set is public. There is no hierarchy; `ADMIN` satisfies
//! only routes that list `ADMIN` verbatim.

use portico_sdk::{ModuleDescriptor, PermissionSet};

/// Decide whether a caller holding `held` may access something that
/// requires `required`.
pub fn is_authorized(required: &PermissionSet, held: &PermissionSet) -> bool {
    if required.is_empty() {
        return true;
    }
    required.intersects(held)
}

/// Decide whether a caller may perform an action category (`send`,
/// `delete`, ...) in a module.
///
/// A category the module never declared is denied. A declared but empty
/// category is public, like an empty route gate.
pub fn can_perform(module: &ModuleDescriptor, action: &str, held: &PermissionSet) -> bool {
    module
        .permissions
        .get(action)
        .is_some_and(|required| is_authorized(required, held))
}

/// Action categories of `module` the caller may perform, in sorted order.
pub fn allowed_actions<'a>(
    module: &'a ModuleDescriptor,
    held: &PermissionSet,
) -> Vec<&'a str> {
    module
        .permissions
        .iter()
        .filter(|(_, required)| is_authorized(required, held))
        .map(|(action, _)| action.as_str())
        .collect()
}
