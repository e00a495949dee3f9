//! Request body guard
//!
//! Caps request bodies before any handler parses them and runs an advisory
//! check for credentials that look weak or inlined. The check only logs.

use std::{
    future::Future,
    pin::Pin,
    sync::LazyLock,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::Request,
    http::{Method, header::CONTENT_LENGTH},
    response::{IntoResponse, Response},
};
use regex::Regex;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Bodies that mention a password next to `123` or an inline quoted value
const WEAK_PASSWORD_PATTERN: &str = r#"password.*123|password.*=.*['"`]"#;

static WEAK_PASSWORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(WEAK_PASSWORD_PATTERN).ok());

/// Whether a request body trips the weak-credential heuristic
pub fn looks_like_weak_password(body: &str) -> bool {
    WEAK_PASSWORD
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(body))
}

/// Layer that enforces the body size limit
#[derive(Clone, Debug)]
pub struct BodyGuardLayer {
    max_bytes: usize,
    credential_check: bool,
}

impl BodyGuardLayer {
    /// Create a guard rejecting bodies over `max_bytes`
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            credential_check: true,
        }
    }

    /// Toggle the advisory weak-credential log
    #[must_use]
    pub const fn with_credential_check(mut self, enabled: bool) -> Self {
        self.credential_check = enabled;
        self
    }
}

impl<S> Layer<S> for BodyGuardLayer {
    type Service = BodyGuard<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BodyGuard {
            inner,
            max_bytes: self.max_bytes,
            credential_check: self.credential_check,
        }
    }
}

/// Middleware service for the body guard
#[derive(Clone, Debug)]
pub struct BodyGuard<S> {
    inner: S,
    max_bytes: usize,
    credential_check: bool,
}

impl<S> Service<Request> for BodyGuard<S>
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

    fn call(&mut self, req: Request) -> Self::Future {
        let max_bytes = self.max_bytes;
        let credential_check = self.credential_check;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let too_large = ApiError::PayloadTooLarge { limit: max_bytes };

            // Declared length first, so oversized uploads are refused unread
            let declared = req
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared.is_some_and(|len| len > max_bytes) {
                debug!(declared, limit = max_bytes, "Rejected oversized request body");
                return Ok(too_large.into_response());
            }

            let (parts, body) = req.into_parts();
            let Ok(bytes) = axum::body::to_bytes(body, max_bytes).await else {
                debug!(limit = max_bytes, "Request body exceeded limit while reading");
                return Ok(too_large.into_response());
            };

            if credential_check
                && parts.method == Method::POST
                && looks_like_weak_password(&String::from_utf8_lossy(&bytes))
            {
                warn!(path = %parts.uri.path(), "Weak password detected in request");
            }

            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}
