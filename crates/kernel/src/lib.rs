//! Portico Kernel Library
//!
//! Module registry, route composition, access guard and the HTTP shell.
//! The main entry point for running the server is the `portico` binary.

pub mod caller;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod menu;
pub mod permissions;
pub mod registry;
pub mod routes;
pub mod routing;
pub mod session;
pub mod shell;
pub mod state;
