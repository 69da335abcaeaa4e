//! Registry configuration errors and warnings.
//!
//! Errors are fatal to startup. Warnings describe configurations that are
//! legal but likely unintended; they are logged and kept on the registry
//! for tooling (`portico check`).

use std::fmt;

use portico_sdk::PermissionSet;
use thiserror::Error;

use super::pattern::PatternError;

/// A single configuration error found while registering modules.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigIssue {
    /// Module at the given input position has an empty id.
    #[error("module #{position}: id is empty")]
    EmptyModuleId { position: usize },

    /// Two descriptors share an id.
    #[error("module '{id}': id is declared more than once")]
    DuplicateModuleId { id: String },

    /// A route, navigation or quick action path is malformed.
    #[error("module '{module}': {kind} path '{path}' is malformed: {reason}")]
    MalformedPath {
        module: String,
        kind: &'static str,
        path: String,
        reason: PatternError,
    },

    /// A path that the kernel's own endpoints would always answer first.
    #[error("module '{module}': {kind} path '{path}' is reserved for kernel endpoint '{reserved}'")]
    ReservedPath {
        module: String,
        kind: &'static str,
        path: String,
        reserved: String,
    },

    /// The same route path is declared twice.
    #[error("route '{path}' is declared by both '{first}' and '{second}'")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },

    /// A permission token is empty or contains whitespace or commas.
    #[error("module '{module}': {context} has malformed permission token {token:?}")]
    MalformedPermission {
        module: String,
        context: String,
        token: String,
    },

    /// An action category name is empty.
    #[error("module '{module}': action category name is empty")]
    EmptyActionCategory { module: String },
}

/// Registration failed; carries every issue found, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid module configuration: {}", summarize(.issues))]
pub struct RegistryError {
    pub issues: Vec<ConfigIssue>,
}

fn summarize(issues: &[ConfigIssue]) -> String {
    match issues {
        [single] => single.to_string(),
        _ => {
            let lines: Vec<String> = issues.iter().map(|i| format!("\n  - {i}")).collect();
            format!("{} issues:{}", issues.len(), lines.concat())
        }
    }
}

/// A legal but suspicious configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A navigation entry's permissions differ from its target route's.
    NavigationPermissionMismatch {
        module: String,
        path: String,
        navigation: PermissionSet,
        route: PermissionSet,
    },

    /// A navigation entry points at a path no route matches.
    DanglingNavigation { module: String, path: String },

    /// A quick action points at a path no route matches.
    DanglingQuickAction { module: String, path: String },

    /// An earlier module's route pattern overlaps a later module's, so the
    /// later route is unreachable for every path both match.
    ShadowedRoute {
        winner_module: String,
        winner: String,
        shadowed_module: String,
        shadowed: String,
    },

    /// A route overlaps a kernel endpoint, which answers first for every
    /// path both match.
    KernelOverlap {
        module: String,
        path: String,
        endpoint: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NavigationPermissionMismatch {
                module,
                path,
                navigation,
                route,
            } => write!(
                f,
                "module '{module}': navigation entry '{path}' requires [{navigation}] but the route requires [{route}]"
            ),
            Self::DanglingNavigation { module, path } => write!(
                f,
                "module '{module}': navigation entry '{path}' does not match any route"
            ),
            Self::DanglingQuickAction { module, path } => write!(
                f,
                "module '{module}': quick action '{path}' does not match any route and will never be shown"
            ),
            Self::ShadowedRoute {
                winner_module,
                winner,
                shadowed_module,
                shadowed,
            } => write!(
                f,
                "route '{shadowed}' of '{shadowed_module}' is shadowed by '{winner}' of '{winner_module}' for overlapping paths"
            ),
            Self::KernelOverlap {
                module,
                path,
                endpoint,
            } => write!(
                f,
                "module '{module}': route '{path}' is shadowed by kernel endpoint '{endpoint}' for overlapping paths"
            ),
        }
    }
}
