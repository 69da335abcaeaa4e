//! Module manifests - feature modules declared on disk.
//!
//! This module handles:
//! - Discovering module directories under the modules directory
//! - Parsing each directory's `.module.toml` manifest
//! - Resolving view components to file-backed lazy loaders
//!
//! Directories are visited in name order, so descriptors with equal
//! `order` always register in the same sequence.

mod component;
mod error;
mod parser;

use std::path::{Path, PathBuf};

use portico_sdk::ModuleDescriptor;
use tracing::{debug, info};

pub use component::FileComponent;
pub use error::ManifestError;
pub use parser::{MANIFEST_SUFFIX, ModuleManifest, RouteManifest};

/// Discover and parse every module under `modules_dir`.
///
/// A missing directory yields no modules. Any unreadable directory or
/// invalid manifest fails the whole discovery: configuration errors are
/// startup errors.
pub fn discover_modules(modules_dir: &Path) -> Result<Vec<ModuleDescriptor>, ManifestError> {
    if !modules_dir.exists() {
        info!(
            ?modules_dir,
            "modules directory does not exist, nothing to discover"
        );
        return Ok(Vec::new());
    }

    let mut dirs = list_dir(modules_dir)?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();
    dirs.sort();

    let mut descriptors = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let manifest_path = find_manifest(&dir)?;
        let descriptor = ModuleManifest::parse(&manifest_path)?.into_descriptor(&dir)?;
        debug!(
            module = %descriptor.id,
            routes = descriptor.routes.len(),
            path = %manifest_path.display(),
            "module manifest loaded"
        );
        descriptors.push(descriptor);
    }

    info!(count = descriptors.len(), "module manifests discovered");
    Ok(descriptors)
}

fn list_dir(dir: &Path) -> Result<Vec<PathBuf>, ManifestError> {
    let unreadable = |e: std::io::Error| ManifestError::UnreadableDirectory {
        path: dir.display().to_string(),
        details: e.to_string(),
    };
    std::fs::read_dir(dir)
        .map_err(unreadable)?
        .map(|entry| entry.map(|e| e.path()).map_err(unreadable))
        .collect()
}

fn find_manifest(dir: &Path) -> Result<PathBuf, ManifestError> {
    let mut manifests: Vec<PathBuf> = list_dir(dir)?
        .into_iter()
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MANIFEST_SUFFIX))
        })
        .collect();

    match manifests.len() {
        0 => Err(ManifestError::MissingManifest {
            dir: dir.display().to_string(),
        }),
        1 => Ok(manifests.remove(0)),
        _ => Err(ManifestError::MultipleManifests {
            dir: dir.display().to_string(),
        }),
    }
}
