//! Bearer token authentication middleware
//!
//! Reads the token from `Authorization: Bearer …`, falling back to the JWT
//! cookie, runs it through the [`TokenValidator`] and exposes the result to
//! handlers as [`AuthenticatedSession`].

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::services::TokenValidator;
use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use domain::DecodedToken;
use tower::{Layer, Service};
use tracing::debug;

use crate::error::ApiError;

/// A request whose bearer token passed validation
#[derive(Clone)]
pub struct AuthenticatedSession {
    /// Validated payload
    pub token: DecodedToken,
    /// The token as presented, needed for refresh
    pub raw_token: String,
}

impl std::fmt::Debug for AuthenticatedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("token", &self.token)
            .field("raw_token", &"[REDACTED]")
            .finish()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

/// Extract the presented token, header first then cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Layer that requires a valid session token
#[derive(Clone, Debug)]
pub struct SessionAuthLayer {
    validator: Arc<TokenValidator>,
    cookie_name: Arc<str>,
}

impl SessionAuthLayer {
    /// Create a new auth layer
    #[must_use]
    pub fn new(validator: Arc<TokenValidator>, cookie_name: impl Into<Arc<str>>) -> Self {
        Self {
            validator,
            cookie_name: cookie_name.into(),
        }
    }
}

impl<S> Layer<S> for SessionAuthLayer {
    type Service = SessionAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionAuth {
            inner,
            validator: Arc::clone(&self.validator),
            cookie_name: Arc::clone(&self.cookie_name),
        }
    }
}

/// Middleware service for session authentication
#[derive(Clone, Debug)]
pub struct SessionAuth<S> {
    inner: S,
    validator: Arc<TokenValidator>,
    cookie_name: Arc<str>,
}

impl<S> Service<Request> for SessionAuth<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let validator = Arc::clone(&self.validator);
        let token = extract_token(req.headers(), &self.cookie_name);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(raw_token) = token else {
                return Ok(
                    ApiError::Unauthorized("Missing bearer token".to_string()).into_response()
                );
            };

            match validator.validate_token(&raw_token).await {
                Ok(token) => {
                    req.extensions_mut()
                        .insert(AuthenticatedSession { token, raw_token });
                    inner.call(req).await
                },
                Err(e) => {
                    debug!(error = %e, "Token rejected");
                    Ok(ApiError::from(e).into_response())
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(
            "cookie",
            HeaderValue::from_static("sessionguard-jwt=cookie-token"),
        );

        assert_eq!(
            extract_token(&headers, "sessionguard-jwt").as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn cookie_is_used_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("other=x; sessionguard-jwt=cookie-token"),
        );

        assert_eq!(
            extract_token(&headers, "sessionguard-jwt").as_deref(),
            Some("cookie-token")
        );
    }

    #[test]
    fn non_bearer_schemes_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));

        assert_eq!(extract_token(&headers, "sessionguard-jwt"), None);
    }

    #[test]
    fn empty_bearer_is_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));

        assert_eq!(extract_token(&headers, "sessionguard-jwt"), None);
    }
}
