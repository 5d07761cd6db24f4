// Identity middleware for protected routes

use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequestParts, Query, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::CurrentUser};
use crate::AppState;

/// Largest body the middleware will buffer while looking for a `token` field
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Header consulted after the body and query string
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Body,
    Query,
    AccessTokenHeader,
    BearerHeader,
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenSource::Body => "body",
            TokenSource::Query => "query",
            TokenSource::AccessTokenHeader => ACCESS_TOKEN_HEADER,
            TokenSource::BearerHeader => "authorization",
        };
        f.write_str(name)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn token_from_body(body: &[u8]) -> Option<String> {
    // Bodies that are not JSON objects simply carry no token
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.as_object()?.get("token")?.as_str().and_then(non_empty)
}

fn token_from_query(uri: &Uri) -> Option<String> {
    let Query(field) = Query::<TokenQuery>::try_from_uri(uri).ok()?;
    field.token.as_deref().and_then(non_empty)
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn header_str<'a>(headers: &'a HeaderMap, name: impl header::AsHeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Find the session token in a request
///
/// Sources are tried in order: body field `token`, query parameter `token`,
/// `x-access-token` header, then the text after `Bearer ` in `Authorization`.
/// The first non-empty value wins. Absence of every source yields `None`.
pub fn extract_token(body: &[u8], uri: &Uri, headers: &HeaderMap) -> Option<(String, TokenSource)> {
    if let Some(token) = token_from_body(body) {
        return Some((token, TokenSource::Body));
    }
    if let Some(token) = token_from_query(uri) {
        return Some((token, TokenSource::Query));
    }
    if let Some(token) = header_str(headers, ACCESS_TOKEN_HEADER).and_then(non_empty) {
        return Some((token, TokenSource::AccessTokenHeader));
    }
    header_str(headers, header::AUTHORIZATION)
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(non_empty)
        .map(|token| (token, TokenSource::BearerHeader))
}

/// Gate in front of protected handlers
///
/// Resolves the request's token to a `CurrentUser` and stores it in the
/// request extensions. Any failure responds immediately and the inner
/// handler never runs.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();
    let (parts, body) = request.into_parts();

    // The body is buffered so the token field can be read, then handed on intact
    let bytes = to_bytes(body, MAX_BODY_BYTES).await.map_err(|e| {
        warn!("Could not read request body for {}: {}", endpoint, e);
        AuthError::ValidationError("Request body could not be read".to_string())
    })?;

    let Some((token, source)) = extract_token(&bytes, &parts.uri, &parts.headers) else {
        warn!("No token supplied to protected endpoint: {}", endpoint);
        return Err(AuthError::MissingToken);
    };

    let user = state.auth.resolve_token(&token).await.map_err(|e| {
        warn!("Rejected token from {} for {}: {}", source, endpoint, e);
        e
    })?;

    debug!("Authenticated user {} via {} for {}", user.id, source, endpoint);

    let mut request = axum::http::Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Extractor for the identity attached by `require_auth`
///
/// Only usable on routes behind the middleware; elsewhere it rejects with
/// `MissingToken`.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn uri(s: &str) -> Uri {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_sources_yields_none() {
        assert_eq!(extract_token(b"", &uri("/api/addtocart"), &HeaderMap::new()), None);
    }

    #[test]
    fn test_missing_authorization_header_does_not_panic() {
        let h = headers(&[("content-type", "application/json")]);
        assert_eq!(extract_token(br#"{"productId":"x"}"#, &uri("/"), &h), None);
    }

    #[test]
    fn test_body_token_wins_over_bearer_header() {
        let h = headers(&[("authorization", "Bearer header-token")]);
        let found = extract_token(br#"{"token":"body-token"}"#, &uri("/"), &h);
        assert_eq!(found, Some(("body-token".to_string(), TokenSource::Body)));
    }

    #[test]
    fn test_full_precedence_order() {
        let all = headers(&[("x-access-token", "header-token"), ("authorization", "Bearer bearer-token")]);

        let found = extract_token(b"", &uri("/?token=query-token"), &all);
        assert_eq!(found, Some(("query-token".to_string(), TokenSource::Query)));

        let found = extract_token(b"", &uri("/"), &all);
        assert_eq!(found, Some(("header-token".to_string(), TokenSource::AccessTokenHeader)));

        let bearer_only = headers(&[("authorization", "Bearer bearer-token")]);
        let found = extract_token(b"", &uri("/"), &bearer_only);
        assert_eq!(found, Some(("bearer-token".to_string(), TokenSource::BearerHeader)));
    }

    #[test]
    fn test_empty_values_fall_through() {
        let h = headers(&[("x-access-token", ""), ("authorization", "Bearer real")]);
        let found = extract_token(br#"{"token":""}"#, &uri("/?token="), &h);
        assert_eq!(found, Some(("real".to_string(), TokenSource::BearerHeader)));
    }

    #[test]
    fn test_authorization_without_bearer_prefix_is_ignored() {
        let h = headers(&[("authorization", "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_token(b"", &uri("/"), &h), None);

        let h = headers(&[("authorization", "Bearer ")]);
        assert_eq!(extract_token(b"", &uri("/"), &h), None);
    }

    #[test]
    fn test_non_json_or_non_string_body_token_is_ignored() {
        assert_eq!(extract_token(b"token=abc", &uri("/"), &HeaderMap::new()), None);
        assert_eq!(extract_token(br#"{"token":42}"#, &uri("/"), &HeaderMap::new()), None);
        assert_eq!(extract_token(br#"["token"]"#, &uri("/"), &HeaderMap::new()), None);
    }

    #[test]
    fn test_query_token_is_percent_decoded() {
        let found = extract_token(b"", &uri("/?other=1&token=a%2Eb"), &HeaderMap::new());
        assert_eq!(found, Some(("a.b".to_string(), TokenSource::Query)));
    }
}
