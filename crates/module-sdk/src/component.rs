//! Lazily loadable view references.
//!
//! A module owns its views; the kernel only ever holds a [`ComponentRef`]
//! and asks it to load once a navigation has been authorized.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// A resolved view: an HTML fragment produced by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    /// Fragment markup, inserted into the shell as-is.
    pub body: String,
}

impl View {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

/// Errors raised while resolving a component reference.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The referenced view does not exist.
    #[error("view '{component}' not found")]
    Missing { component: String },

    /// Reading the view failed.
    #[error("view '{component}' could not be read: {details}")]
    Io { component: String, details: String },

    /// The load did not finish within the configured time.
    #[error("view '{component}' did not load within {millis}ms")]
    TimedOut { component: String, millis: u64 },

    /// Any other loader-specific failure.
    #[error("view '{component}' failed to load: {message}")]
    Failed { component: String, message: String },
}

impl LoadError {
    pub fn failed(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Something that can produce a [`View`] asynchronously.
///
/// Implementations must not perform side effects until [`load`] is
/// called: the kernel relies on never calling it for a denied navigation.
///
/// [`load`]: ComponentLoader::load
#[async_trait]
pub trait ComponentLoader: Send + Sync + fmt::Debug {
    /// Resolve the view.
    async fn load(&self) -> Result<View, LoadError>;

    /// Short human-readable name of the component (for route listings
    /// and error messages).
    fn describe(&self) -> String;
}

/// Shared handle to a module's component loader.
pub type ComponentRef = Arc<dyn ComponentLoader>;

/// A loader that resolves immediately to a fixed fragment.
///
/// Handy for modules that declare their views in code.
#[derive(Debug, Clone)]
pub struct StaticComponent {
    name: String,
    body: String,
}

impl StaticComponent {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }

    /// Wrap into a shareable [`ComponentRef`].
    pub fn into_ref(self) -> ComponentRef {
        Arc::new(self)
    }
}

#[async_trait]
impl ComponentLoader for StaticComponent {
    async fn load(&self) -> Result<View, LoadError> {
        Ok(View::new(self.body.clone()))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_component_loads_body() {
        let component = StaticComponent::new("inbox", "<p>Inbox</p>").into_ref();
        assert_eq!(component.describe(), "inbox");
        assert_eq!(component.load().await.unwrap(), View::new("<p>Inbox</p>"));
    }

    #[test]
    fn load_errors_name_the_component() {
        let err = LoadError::TimedOut {
            component: "views/inbox.html".into(),
            millis: 250,
        };
        let msg = err.to_string();
        assert!(msg.contains("views/inbox.html"));
        assert!(msg.contains("250ms"));
    }
}
