//! Route definitions

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    handlers,
    middleware::{
        BodyGuardLayer, LoginRateLimitLayer, SecurityAuditLayer, SecurityHeadersLayer,
        SessionAuthLayer,
    },
    state::AppState,
};

/// Create the router with all routes
///
/// Routes under `/auth` other than login require a valid session token.
pub fn create_router(state: AppState) -> Router {
    let auth_layer = SessionAuthLayer::new(
        Arc::clone(&state.validator),
        state.config.security.jwt_cookie_name.as_str(),
    );

    let protected = Router::new()
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/password", post(handlers::auth::change_password))
        .route("/auth/session", get(handlers::auth::session_info))
        .route_layer(auth_layer);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/auth/login", post(handlers::auth::login))
        .merge(protected)
        .with_state(state)
}

/// Create the router wrapped in the security pipeline
///
/// Order, outermost first: security headers, audit log, body guard, rate
/// limiting. Headers therefore also land on rejections from inner layers.
pub fn create_app(state: AppState) -> Router {
    let security = &state.config.security;

    let rate_limit = LoginRateLimitLayer::new(
        Arc::clone(&state.rate_limits),
        security.rate_limit_enabled,
    )
    .trust_proxies(security.trusted_proxies.clone());
    let body_guard = BodyGuardLayer::new(state.config.server.max_body_bytes)
        .with_credential_check(security.weak_password_check);
    let audit = SecurityAuditLayer::new(security.trusted_proxies.clone());
    let headers = SecurityHeadersLayer::new(security.no_store_prefixes.clone());

    create_router(state.clone())
        .layer(rate_limit)
        .layer(body_guard)
        .layer(audit)
        .layer(headers)
}
