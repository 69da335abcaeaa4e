//! Caller extraction from proxy-supplied request headers.
//!
//! Portico never validates credentials. An authenticating proxy in front
//! of it sets the permission header (comma separated tokens) and,
//! optionally, a principal label. A request without the permission header
//! is anonymous and sees only public routes.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use portico_sdk::PermissionSet;

use crate::caller::CallerContext;
use crate::config::Config;
use crate::state::AppState;

/// The caller of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub Arc<CallerContext>);

/// Build a caller context from request headers.
///
/// Header values that are not valid UTF-8 are ignored.
pub fn caller_from_headers(headers: &HeaderMap, config: &Config) -> CallerContext {
    let held = headers
        .get(config.permissions_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(PermissionSet::from_csv)
        .unwrap_or_default();

    let caller = CallerContext::new(held);
    match headers
        .get(config.principal_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        Some(principal) => caller.with_principal(principal),
        None => caller,
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(Arc::new(caller_from_headers(
            &parts.headers,
            state.config(),
        ))))
    }
}
