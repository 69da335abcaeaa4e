//! File-backed view components.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use portico_sdk::{ComponentLoader, LoadError, View};
use tokio::fs;
use tracing::debug;

use super::ManifestError;

/// A view fragment stored in a module's directory, read on first use.
#[derive(Debug, Clone)]
pub struct FileComponent {
    module: String,
    root: PathBuf,
    relative: PathBuf,
}

impl FileComponent {
    /// Create a component for `relative` inside `root`.
    ///
    /// Rejects absolute paths and `..` components so a manifest can only
    /// reference files inside its own module directory.
    pub fn new(
        module: impl Into<String>,
        root: impl Into<PathBuf>,
        relative: &str,
    ) -> Result<Self, ManifestError> {
        let module = module.into();
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe {
            return Err(ManifestError::UnsafeComponent {
                module,
                component: relative.to_string(),
            });
        }
        Ok(Self {
            module,
            root: root.into(),
            relative: path.to_path_buf(),
        })
    }

    fn name(&self) -> String {
        format!("{}:{}", self.module, self.relative.display())
    }
}

#[async_trait]
impl ComponentLoader for FileComponent {
    async fn load(&self) -> Result<View, LoadError> {
        let path = self.root.join(&self.relative);
        match fs::read_to_string(&path).await {
            Ok(body) => {
                debug!(component = %self.name(), size = body.len(), "view read");
                Ok(View::new(body))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(LoadError::Missing {
                component: self.name(),
            }),
            Err(e) => Err(LoadError::Io {
                component: self.name(),
                details: e.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        self.name()
    }
}
