//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderName;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Path to modules directory (default: ./modules).
    pub modules_dir: PathBuf,

    /// Module ids to leave out of the registry (from DISABLED_MODULES).
    pub disabled_modules: Vec<String>,

    /// Upper bound for a single component load (default: 5000ms).
    pub load_timeout: Duration,

    /// Request header carrying the caller's comma-separated permission
    /// tokens, set by the authenticating proxy in front of Portico
    /// (default: x-portico-permissions).
    pub permissions_header: String,

    /// Request header carrying an opaque principal label for logs
    /// (default: x-portico-principal).
    pub principal_header: String,

    /// Token required to enable or disable modules at runtime
    /// (default: MODULES_ADMIN).
    pub admin_permission: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let modules_dir = env::var("MODULES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./modules"));

        let disabled_modules = env::var("DISABLED_MODULES")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        let load_timeout_ms: u64 = env::var("LOAD_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("LOAD_TIMEOUT_MS must be a valid u64")?;

        let permissions_header = header_name(
            &env::var("PERMISSIONS_HEADER").unwrap_or_else(|_| "x-portico-permissions".to_string()),
        )
        .context("PERMISSIONS_HEADER must be a valid HTTP header name")?;

        let principal_header = header_name(
            &env::var("PRINCIPAL_HEADER").unwrap_or_else(|_| "x-portico-principal".to_string()),
        )
        .context("PRINCIPAL_HEADER must be a valid HTTP header name")?;

        let admin_permission =
            env::var("ADMIN_PERMISSION").unwrap_or_else(|_| "MODULES_ADMIN".to_string());

        Ok(Self {
            port,
            modules_dir,
            disabled_modules,
            load_timeout: Duration::from_millis(load_timeout_ms),
            permissions_header,
            principal_header,
            admin_permission,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            modules_dir: PathBuf::from("./modules"),
            disabled_modules: Vec::new(),
            load_timeout: Duration::from_millis(5000),
            permissions_header: "x-portico-permissions".to_string(),
            principal_header: "x-portico-principal".to_string(),
            admin_permission: "MODULES_ADMIN".to_string(),
        }
    }
}

/// Validate a header name, returning its lowercase form. A name that could
/// never match a request header would leave every caller anonymous.
fn header_name(value: &str) -> Result<String> {
    let name = HeaderName::from_str(value.trim())?;
    Ok(name.as_str().to_string())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
