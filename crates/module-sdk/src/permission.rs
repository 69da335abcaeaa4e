//! Permission token sets.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of opaque permission tokens (e.g. `EMAIL_ADMIN`).
///
/// Used both for what a route requires and for what a caller holds. An
/// empty required set means the route is public. Tokens carry no hierarchy
/// or wildcard meaning: `ADMIN` does not imply `EMAIL_USER`.
///
/// Deserializes from a plain list of strings; a missing field should be
/// marked `#[serde(default)]` by the containing type, which yields an empty
/// (public) set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// The empty set, spelled for readability at route declarations.
    pub fn public() -> Self {
        Self::new()
    }

    /// Parse a comma-separated token list, trimming whitespace and
    /// skipping empty entries.
    pub fn from_csv(value: &str) -> Self {
        value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Add a token. Returns `true` if it was not already present.
    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.0.insert(token.into())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the two sets share at least one token.
    pub fn intersects(&self, other: &PermissionSet) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().any(|t| large.0.contains(t))
    }

    /// Iterate tokens in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for PermissionSet {
    fn from(tokens: [S; N]) -> Self {
        tokens.into_iter().collect()
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("(public)");
        }
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(", "))
    }
}
