//! Module manifest errors with clear, actionable messages.

use thiserror::Error;

/// Errors raised while discovering and parsing module manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The modules directory could not be listed.
    #[error("modules directory '{path}' could not be read: {details}")]
    UnreadableDirectory { path: String, details: String },

    /// Module directory has no `.module.toml` manifest.
    #[error("module directory '{dir}': no .module.toml manifest found")]
    MissingManifest { dir: String },

    /// More than one manifest in one module directory.
    #[error("module directory '{dir}': multiple .module.toml files found, expected exactly one")]
    MultipleManifests { dir: String },

    /// The manifest is not valid TOML or does not fit the schema.
    #[error("manifest '{path}': {details}")]
    InvalidManifest { path: String, details: String },

    /// The manifest file name does not match the declared id.
    #[error("manifest '{path}': declares id '{id}' but the file is named for '{expected}'")]
    IdMismatch {
        path: String,
        id: String,
        expected: String,
    },

    /// A component path escapes the module directory.
    #[error(
        "module '{module}': component '{component}' must be a relative path inside the module directory"
    )]
    UnsafeComponent { module: String, component: String },
}

impl ManifestError {
    pub fn invalid(path: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            details: details.into(),
        }
    }
}
