//! Rate limiting middleware
//!
//! Fixed-window attempt counting per client IP on configured path prefixes.
//! Each rule owns its own limiter, so login attempts and general API
//! traffic are counted separately.

use std::{
    future::Future,
    net::IpAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::ports::LoginRateLimiterPort;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use infrastructure::{InMemoryLoginRateLimiter, RateLimitRuleConfig};
use tower::{Layer, Service};
use tracing::warn;

use crate::{error::ApiError, middleware::client_ip::client_ip};

/// A path prefix together with the limiter that guards it
#[derive(Clone)]
pub struct RateLimitRule {
    config: RateLimitRuleConfig,
    limiter: Arc<dyn LoginRateLimiterPort>,
}

impl std::fmt::Debug for RateLimitRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitRule")
            .field("path_prefix", &self.config.path_prefix)
            .field("policy", &self.limiter.policy())
            .finish_non_exhaustive()
    }
}

impl RateLimitRule {
    /// Create a rule with a custom limiter
    pub fn new(config: RateLimitRuleConfig, limiter: Arc<dyn LoginRateLimiterPort>) -> Self {
        Self { config, limiter }
    }

    /// Create a rule backed by an in-memory limiter with the rule's policy
    #[must_use]
    pub fn in_memory(config: RateLimitRuleConfig) -> Self {
        let limiter = Arc::new(InMemoryLoginRateLimiter::new(config.policy()));
        Self::new(config, limiter)
    }

    /// The limiter, for cleanup tasks
    #[must_use]
    pub fn limiter(&self) -> Arc<dyn LoginRateLimiterPort> {
        Arc::clone(&self.limiter)
    }

    /// Path prefix this rule guards
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.config.path_prefix
    }

    fn matches(&self, path: &str) -> bool {
        self.config.matches(path)
    }
}

/// Counter key for a client address
pub fn client_identifier(ip: IpAddr) -> String {
    format!("ip:{ip}")
}

/// Layer that applies rate limiting
#[derive(Clone, Debug)]
pub struct LoginRateLimitLayer {
    rules: Arc<[RateLimitRule]>,
    enabled: bool,
    trusted_proxies: Arc<[IpAddr]>,
}

impl LoginRateLimitLayer {
    /// Create a new rate limiter layer; the first matching rule wins
    #[must_use]
    pub fn new(rules: Arc<[RateLimitRule]>, enabled: bool) -> Self {
        Self {
            rules,
            enabled,
            trusted_proxies: Arc::from([]),
        }
    }

    /// Proxies allowed to set `X-Forwarded-For`
    #[must_use]
    pub fn trust_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies.into();
        self
    }
}

impl<S> Layer<S> for LoginRateLimitLayer {
    type Service = LoginRateLimit<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoginRateLimit {
            inner,
            rules: Arc::clone(&self.rules),
            enabled: self.enabled,
            trusted_proxies: Arc::clone(&self.trusted_proxies),
        }
    }
}

/// Middleware service for rate limiting
#[derive(Clone, Debug)]
pub struct LoginRateLimit<S> {
    inner: S,
    rules: Arc<[RateLimitRule]>,
    enabled: bool,
    trusted_proxies: Arc<[IpAddr]>,
}

impl<S> Service<Request> for LoginRateLimit<S>
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
        let mut inner = self.inner.clone();

        let rule = if self.enabled {
            self.rules
                .iter()
                .find(|rule| rule.matches(req.uri().path()))
                .cloned()
        } else {
            None
        };

        let Some(rule) = rule else {
            return Box::pin(async move { inner.call(req).await });
        };

        let ip = client_ip(&req, &self.trusted_proxies);
        let identifier = client_identifier(ip);

        Box::pin(async move {
            if rule.limiter.is_allowed(&identifier) {
                return inner.call(req).await;
            }

            warn!(
                client_ip = %ip,
                path = %req.uri().path(),
                rule = %rule.config.path_prefix,
                "Rate limit exceeded"
            );
            Ok(ApiError::RateLimited(rule.config.message.clone()).into_response())
        })
    }
}
