//! Security audit logging
//!
//! Every 401 or 403 leaving the service is logged with the path, client
//! address, user agent and a timestamp.

use std::{
    future::Future,
    net::IpAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    extract::Request,
    http::{StatusCode, header::USER_AGENT},
    response::Response,
};
use chrono::{SecondsFormat, Utc};
use tower::{Layer, Service};
use tracing::warn;

use crate::middleware::client_ip::client_ip;

/// Whether a status is an authentication or authorization failure
pub const fn is_security_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Layer that logs security failures
#[derive(Clone, Debug, Default)]
pub struct SecurityAuditLayer {
    trusted_proxies: Arc<[IpAddr]>,
}

impl SecurityAuditLayer {
    #[must_use]
    pub fn new(trusted_proxies: Vec<IpAddr>) -> Self {
        Self {
            trusted_proxies: trusted_proxies.into(),
        }
    }
}

impl<S> Layer<S> for SecurityAuditLayer {
    type Service = SecurityAudit<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityAudit {
            inner,
            trusted_proxies: Arc::clone(&self.trusted_proxies),
        }
    }
}

/// Middleware service for audit logging
#[derive(Clone, Debug)]
pub struct SecurityAudit<S> {
    inner: S,
    trusted_proxies: Arc<[IpAddr]>,
}

impl<S> Service<Request> for SecurityAudit<S>
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
        let path = req.uri().path().to_string();
        let ip = client_ip(&req, &self.trusted_proxies);
        let user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;

            if is_security_failure(response.status()) {
                warn!(
                    status = response.status().as_u16(),
                    path = %path,
                    client_ip = %ip,
                    user_agent = %user_agent,
                    timestamp = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    "Authentication/authorization error"
                );
            }

            Ok(response)
        })
    }
}
