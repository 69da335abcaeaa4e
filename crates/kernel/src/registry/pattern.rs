//! URL route patterns.
//!
//! Pattern: "/companies/:id/contacts"
//! Path: "/companies/42/contacts"
//! Result: Some({"id": "42"})

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[allow(clippy::expect_used)]
static PARAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter name regex is valid")
});

// RFC 3986 pchar without percent-encoding, so literals are already canonical.
#[allow(clippy::expect_used)]
static LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._~!$&'()*+,;=:@]+$").expect("literal segment regex is valid")
});

/// Reasons a route pattern is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("path is empty")]
    Empty,

    #[error("path must start with '/'")]
    MissingLeadingSlash,

    #[error("path contains an empty segment")]
    EmptySegment,

    #[error("path must not end with '/'")]
    TrailingSlash,

    #[error("invalid parameter name ':{0}'")]
    InvalidParam(String),

    #[error("parameter ':{0}' appears more than once")]
    DuplicateParam(String),

    #[error("segment '{0}' contains characters that are not allowed in a URL path")]
    InvalidLiteral(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// Parameters captured while matching a path (name -> decoded value).
pub type RouteParams = BTreeMap<String, String>;

/// A parsed, validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse and validate a pattern string.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash);
        };

        // Root pattern
        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }
        if rest.ends_with('/') {
            return Err(PatternError::TrailingSlash);
        }

        let mut segments = Vec::new();
        let mut seen_params: Vec<&str> = Vec::new();

        for part in rest.split('/') {
            if part.is_empty() {
                return Err(PatternError::EmptySegment);
            }
            if let Some(name) = part.strip_prefix(':') {
                if !PARAM_NAME.is_match(name) {
                    return Err(PatternError::InvalidParam(name.to_string()));
                }
                if seen_params.contains(&name) {
                    return Err(PatternError::DuplicateParam(name.to_string()));
                }
                seen_params.push(name);
                segments.push(Segment::Param(name.to_string()));
            } else if LITERAL.is_match(part) {
                segments.push(Segment::Literal(part.to_string()));
            } else {
                return Err(PatternError::InvalidLiteral(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Number of parameter segments.
    pub fn param_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    /// Match a request path, extracting parameters.
    ///
    /// One trailing `/` on the path is ignored. Path segments are
    /// percent-decoded before comparison; a segment that does not decode to
    /// UTF-8 fails the match.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let rest = path.strip_prefix('/')?;
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();

        for (segment, actual) in self.segments.iter().zip(parts) {
            let decoded = urlencoding::decode(actual).ok()?;
            match segment {
                Segment::Literal(lit) => {
                    if *lit != decoded {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if actual.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decoded.into_owned());
                }
            }
        }

        Some(params)
    }

    /// Whether the first segment is the literal `segment`.
    pub fn starts_with(&self, segment: &str) -> bool {
        matches!(self.segments.first(), Some(Segment::Literal(lit)) if lit == segment)
    }

    /// Whether every path `other` matches is also matched by `self`.
    pub fn covers(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Param(_), _) => true,
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    (Segment::Literal(_), Segment::Param(_)) => false,
                })
    }

    /// Whether some path could be matched by both patterns.
    pub fn overlaps(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|pair| match pair {
                    (Segment::Literal(a), Segment::Literal(b)) => a == b,
                    _ => true,
                })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> RoutePattern {
        RoutePattern::parse(raw).unwrap()
    }

    #[test]
    fn match_exact() {
        let params = pattern("/email/inbox").matches("/email/inbox");
        assert!(params.unwrap().is_empty());
    }

    #[test]
    fn match_root() {
        assert!(pattern("/").matches("/").is_some());
        assert!(pattern("/").matches("/email").is_none());
    }

    #[test]
    fn match_with_params() {
        let params = pattern("/companies/:company_id/contacts/:id")
            .matches("/companies/7/contacts/19")
            .unwrap();
        assert_eq!(params.get("company_id").map(String::as_str), Some("7"));
        assert_eq!(params.get("id").map(String::as_str), Some("19"));
    }

    #[test]
    fn match_decodes_params() {
        let params = pattern("/clients/:name").matches("/clients/Acme%20Inc").unwrap();
        assert_eq!(params.get("name").map(String::as_str), Some("Acme Inc"));
    }

    #[test]
    fn match_ignores_single_trailing_slash() {
        assert!(pattern("/billing").matches("/billing/").is_some());
        assert!(pattern("/billing").matches("/billing//").is_none());
    }

    #[test]
    fn match_rejects_segment_count_and_literal_mismatch() {
        assert!(pattern("/email").matches("/phone").is_none());
        assert!(pattern("/x/:id").matches("/x/1/2").is_none());
        assert!(pattern("/x/:id").matches("/x/").is_none());
        assert!(pattern("/Email").matches("/email").is_none());
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(RoutePattern::parse(""), Err(PatternError::Empty));
        assert_eq!(
            RoutePattern::parse("email"),
            Err(PatternError::MissingLeadingSlash)
        );
        assert_eq!(
            RoutePattern::parse("/email//inbox"),
            Err(PatternError::EmptySegment)
        );
        assert_eq!(
            RoutePattern::parse("/email/"),
            Err(PatternError::TrailingSlash)
        );
        assert_eq!(
            RoutePattern::parse("/x/:"),
            Err(PatternError::InvalidParam(String::new()))
        );
        assert_eq!(
            RoutePattern::parse("/x/:1st"),
            Err(PatternError::InvalidParam("1st".into()))
        );
        assert_eq!(
            RoutePattern::parse("/x/:id/y/:id"),
            Err(PatternError::DuplicateParam("id".into()))
        );
    }

    #[test]
    fn parse_rejects_literals_outside_the_path_charset() {
        for raw in ["/annual reports", "/a?b", "/x#y", "/café", "/50%", "/a%20b"] {
            let segment = raw.trim_start_matches('/').to_string();
            assert_eq!(
                RoutePattern::parse(raw),
                Err(PatternError::InvalidLiteral(segment)),
                "{raw} should be rejected"
            );
        }
        assert!(RoutePattern::parse("/reports/q1-2024_final~v2").is_ok());
        assert!(RoutePattern::parse("/users/@me/a:b").is_ok());
    }

    #[test]
    fn match_decodes_literal_segments() {
        assert!(pattern("/email").matches("/emai%6C").is_some());
        assert!(pattern("/a:b").matches("/a%3Ab").is_some());
        assert!(pattern("/email").matches("/email%2Fx").is_none());
        assert!(pattern("/email").matches("/%FF").is_none());
    }

    #[test]
    fn overlap_detection() {
        assert!(pattern("/x/:id").overlaps(&pattern("/x/:item")));
        assert!(pattern("/x/:id").overlaps(&pattern("/x/new")));
        assert!(!pattern("/x/:id").overlaps(&pattern("/y/:id")));
        assert!(!pattern("/x/:id").overlaps(&pattern("/x/:id/edit")));
    }

    #[test]
    fn cover_detection() {
        assert!(pattern("/x/:id").covers(&pattern("/x/new")));
        assert!(pattern("/x/:id").covers(&pattern("/x/:item")));
        assert!(!pattern("/x/new").covers(&pattern("/x/:id")));
        assert!(!pattern("/:page").covers(&pattern("/x/:id")));
    }

    #[test]
    fn starts_with_literal_only() {
        assert!(pattern("/_portico/routes").starts_with("_portico"));
        assert!(!pattern("/:section/routes").starts_with("_portico"));
        assert!(!pattern("/").starts_with("_portico"));
    }

    #[test]
    fn param_count() {
        assert_eq!(pattern("/a/:b/c/:d").param_count(), 2);
        assert_eq!(pattern("/").param_count(), 0);
    }
}
