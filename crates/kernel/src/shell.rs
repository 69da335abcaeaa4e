//! HTML shell rendering.
//!
//! The shell wraps every navigation outcome: the caller's visible
//! navigation and quick actions are always rendered, and the content
//! area holds either the loaded view or an outcome message.

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;

use crate::menu::{Breadcrumb, NavItem, QuickActionItem};

const SHELL_TEMPLATE: &str = "shell.html";

/// Everything the shell template needs for one page.
#[derive(Debug, Serialize)]
pub struct ShellPage<'a> {
    pub path: &'a str,
    /// `NavigationOutcome::kind` of the navigation being rendered.
    pub outcome: &'a str,
    pub navigation: &'a [NavItem],
    pub quick_actions: &'a [QuickActionItem],
    pub crumb: Option<&'a Breadcrumb>,
    pub heading: &'a str,
    pub message: Option<&'a str>,
    /// Module view fragment, inserted unescaped.
    pub body: Option<&'a str>,
}

/// Renders [`ShellPage`]s with the built-in shell template.
pub struct ShellRenderer {
    tera: Tera,
}

impl ShellRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(SHELL_TEMPLATE, include_str!("../templates/shell.html"))
            .context("failed to parse shell template")?;
        Ok(Self { tera })
    }

    pub fn render(&self, page: &ShellPage<'_>) -> Result<String> {
        let context =
            tera::Context::from_serialize(page).context("failed to build shell context")?;
        self.tera
            .render(SHELL_TEMPLATE, &context)
            .context("failed to render shell")
    }
}
