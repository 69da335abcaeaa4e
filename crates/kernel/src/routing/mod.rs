//! Route composition and per-navigation access control.
//!
//! - [`compose`] turns a registry snapshot into a [`RouteTable`]
//! - [`AccessGuard`] decides each navigation against the table
//! - [`boundary`] resolves the lazily loaded component once allowed
//! - [`Navigator`] ties the three together for one session

pub mod boundary;
mod compose;
mod guard;
mod navigator;

pub use boundary::{LazyComponent, LoadOutcome, LoadState, PendingLoad};
pub use compose::{ComposedRoute, GuardedComponent, RouteTable, compose};
pub use guard::{AccessGuard, GuardDecision, NavigationRequest};
pub use navigator::{
    Navigation, NavigationOutcome, Navigator, PendingPage, RenderedPage,
};
