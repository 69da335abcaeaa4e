//! Caller context - the permission set held by the current session.
//!
//! A [`CallerContext`] is immutable. When permissions change (re-login,
//! role change, revocation) the whole context is replaced in the
//! [`SessionContext`]; readers take an `Arc` snapshot and therefore see
//! either the old or the new context, never a mix.

use std::sync::Arc;

use parking_lot::RwLock;
use portico_sdk::PermissionSet;
use tracing::debug;

/// The actor on whose behalf a navigation runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerContext {
    /// Opaque principal label from the session provider, for logs only.
    pub principal: Option<String>,
    /// Permission tokens held by the caller.
    pub held: PermissionSet,
}

impl CallerContext {
    pub fn new(held: impl Into<PermissionSet>) -> Self {
        Self {
            principal: None,
            held: held.into(),
        }
    }

    /// A caller holding nothing; can only reach public routes.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }
}

/// Holder of the current caller context, shared by a session's navigations.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Debug, Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Arc<CallerContext>>>,
}

impl SessionContext {
    pub fn new(caller: CallerContext) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(caller))),
        }
    }

    /// The context as of now. Later replacements do not affect the
    /// returned snapshot.
    pub fn snapshot(&self) -> Arc<CallerContext> {
        self.current.read().clone()
    }

    /// Replace the context wholesale.
    pub fn replace(&self, caller: CallerContext) {
        debug!(
            principal = caller.principal.as_deref().unwrap_or("-"),
            permissions = %caller.held,
            "caller context replaced"
        );
        *self.current.write() = Arc::new(caller);
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(CallerContext::anonymous())
    }
}
