//! Request extractors for the caller's identity and address.

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, run_blocking};
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use novelforge_accounts::{AccountError, AccountResult};
use novelforge_types::Principal;
use std::convert::Infallible;

/// The authenticated caller. Rejects with 401 when no valid token is presented.
pub struct Authenticated(pub Principal);

/// The caller if a valid token was presented. An unknown token yields an
/// anonymous caller; store failures are still rejected.
pub struct MaybeAuthenticated(pub Option<Principal>);

/// The caller's address as reported by the fronting proxy.
pub struct ClientIp(pub Option<String>);

/// Returns the first `X-Forwarded-For` hop, else `X-Real-IP`.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    forwarded.or_else(real).map(str::to_string)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_string())
}

async fn resolve(parts: &Parts, state: &AppState) -> ApiResult<Option<AccountResult<Principal>>> {
    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };
    let ip = client_ip(&parts.headers);
    run_blocking(state, move |s| {
        Ok(Some(s.accounts.authenticate(&token, ip.as_deref())))
    })
    .await
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await? {
            Some(principal) => Ok(Self(principal?)),
            None => Err(ApiError::unauthenticated()),
        }
    }
}

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve(parts, state).await? {
            Some(Ok(principal)) => Ok(Self(Some(principal))),
            Some(Err(AccountError::Unauthenticated)) | None => Ok(Self(None)),
            Some(Err(e)) => Err(e.into()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(client_ip(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.5, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(client_ip(&headers).as_deref(), Some("203.0.113.5"));
    }

    #[test]
    fn real_ip_is_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(client_ip(&headers).as_deref(), Some("198.51.100.2"));
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc123"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc123"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc123"));
        assert_eq!(bearer_token(&headers), None);
    }
}
