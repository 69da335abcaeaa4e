//! Command-line interface for the `portico` binary.
//!
//! ```text
//! portico              # same as `portico serve`
//! portico serve        # run the HTTP shell
//! portico routes       # print the composed route table
//! portico check        # validate manifests, print diagnostics
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::manifest::discover_modules;
use crate::registry::ModuleRegistry;
use crate::routing::{RouteTable, compose};

/// Portico application shell.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Modules directory (overrides MODULES_DIR).
    #[arg(long, global = true)]
    pub modules_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP shell (default).
    Serve,
    /// Print the composed route table in match order.
    Routes,
    /// Validate module manifests and print registration warnings.
    Check,
}

impl Cli {
    /// Apply command-line overrides to environment configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.modules_dir {
            config.modules_dir.clone_from(dir);
        }
        config
    }

    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

/// Print the route table for the enabled modules.
pub fn routes(config: &Config, out: &mut impl Write) -> Result<()> {
    let registry = load_enabled(config)?;
    write_routes(&compose(&registry), out)
}

/// Validate manifests and registration. Returns `Ok(false)` when the
/// configuration is rejected; the problems are written to `out`.
pub fn check(config: &Config, out: &mut impl Write) -> Result<bool> {
    let descriptors = match discover_modules(&config.modules_dir) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            writeln!(out, "error: {e}")?;
            return Ok(false);
        }
    };

    let registry = match ModuleRegistry::register(descriptors) {
        Ok(registry) => registry,
        Err(e) => {
            for issue in &e.issues {
                writeln!(out, "error: {issue}")?;
            }
            return Ok(false);
        }
    };

    for diagnostic in registry.diagnostics() {
        writeln!(out, "warning: {diagnostic}")?;
    }
    writeln!(
        out,
        "ok: {} modules, {} routes, {} warnings",
        registry.len(),
        compose(&registry).len(),
        registry.diagnostics().len()
    )?;
    Ok(true)
}

fn load_enabled(config: &Config) -> Result<ModuleRegistry> {
    let descriptors = discover_modules(&config.modules_dir).with_context(|| {
        format!(
            "failed to load modules from {}",
            config.modules_dir.display()
        )
    })?;
    let registry = ModuleRegistry::register(descriptors).context("module registration failed")?;
    registry
        .retain(|d| !config.disabled_modules.contains(&d.id))
        .context("module registration failed")
}

fn write_routes(table: &RouteTable, out: &mut impl Write) -> Result<()> {
    let width = table
        .routes()
        .iter()
        .map(|r| r.path().len())
        .max()
        .unwrap_or(0);
    for route in table.routes() {
        writeln!(
            out,
            "{:<width$}  {:<12}  {}  [{}]",
            route.path(),
            route.module_id(),
            route.guarded().describe(),
            route.required_permissions(),
        )?;
    }
    Ok(())
}
