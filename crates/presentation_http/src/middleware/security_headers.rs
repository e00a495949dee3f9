//! Security headers middleware
//!
//! Adds security-related HTTP headers to all responses, rejections included.
//!
//! Headers added:
//! - `X-Content-Type-Options: nosniff` - Prevents MIME type sniffing
//! - `X-Frame-Options: DENY` - Prevents clickjacking
//! - `X-XSS-Protection: 1; mode=block` - XSS filter (legacy browsers)
//! - `Strict-Transport-Security` - HTTPS only for a year, subdomains included
//! - `Referrer-Policy: strict-origin-when-cross-origin` - Controls referrer info
//! - `Permissions-Policy` - Restricts browser features
//!
//! `Server` and `X-Powered-By` are removed. Responses under the configured
//! no-store prefixes (`/auth`, `/dashboard` by default) are marked uncacheable.
//!
//! # Example
//!
//! ```ignore
//! use presentation_http::middleware::SecurityHeadersLayer;
//!
//! let app = Router::new()
//!     .route("/auth/login", post(handler))
//!     .layer(SecurityHeadersLayer::new(vec!["/auth".to_string()]));
//! ```

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{CACHE_CONTROL, PRAGMA, SERVER},
    },
    response::Response,
};
use tower::{Layer, Service};

/// Layer that adds security headers to all responses
#[derive(Clone, Debug, Default)]
pub struct SecurityHeadersLayer {
    no_store_prefixes: Arc<[String]>,
}

impl SecurityHeadersLayer {
    /// Create a new security headers layer
    #[must_use]
    pub fn new(no_store_prefixes: Vec<String>) -> Self {
        Self {
            no_store_prefixes: no_store_prefixes.into(),
        }
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeaders<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeaders {
            inner,
            no_store_prefixes: Arc::clone(&self.no_store_prefixes),
        }
    }
}

/// Middleware service that adds security headers
#[derive(Clone, Debug)]
pub struct SecurityHeaders<S> {
    inner: S,
    no_store_prefixes: Arc<[String]>,
}

impl<S> Service<Request> for SecurityHeaders<S>
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
        let no_store = self
            .no_store_prefixes
            .iter()
            .any(|prefix| req.uri().path().starts_with(prefix.as_str()));
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            let headers = response.headers_mut();

            headers.remove(SERVER);
            headers.remove(HeaderName::from_static("x-powered-by"));

            headers.insert(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            );
            // Legacy browsers only
            headers.insert(
                HeaderName::from_static("x-xss-protection"),
                HeaderValue::from_static("1; mode=block"),
            );
            headers.insert(
                HeaderName::from_static("strict-transport-security"),
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            );
            headers.insert(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            headers.insert(
                HeaderName::from_static("permissions-policy"),
                HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
            );

            if no_store {
                headers.insert(
                    CACHE_CONTROL,
                    HeaderValue::from_static("no-store, no-cache, must-revalidate"),
                );
                headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
            }

            Ok(response)
        })
    }
}
