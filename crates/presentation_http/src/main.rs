//! Session security HTTP server
//!
//! Main entry point for the HTTP API server.

use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use infrastructure::{
    AppConfig, SecurityValidator, TelemetryConfig, init_telemetry,
    validation::ALLOW_INSECURE_ENV,
};
use presentation_http::{AppState, RateLimitRule, error::set_expose_internal_errors, routes, tasks};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the configured format applies.
    // A broken config must not silently fall back to development defaults.
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_telemetry(&TelemetryConfig::from_app_config(&config))?;
    info!("sessionguard v{} starting...", env!("CARGO_PKG_VERSION"));

    info!(
        host = %config.server.host,
        port = %config.server.port,
        environment = %config.environment(),
        "Configuration loaded"
    );

    let warnings = SecurityValidator::validate(&config);
    SecurityValidator::log_warnings(&warnings);
    if SecurityValidator::should_block_startup(&config, &warnings) {
        anyhow::bail!(
            "Refusing to start in production with critical security issues; \
             fix them or set {ALLOW_INSECURE_ENV}=true"
        );
    }

    set_expose_internal_errors(!config.is_production());

    let state = AppState::from_config(config.clone())?;

    let cleanup_handle = config.security.rate_limit_enabled.then(|| {
        tasks::spawn_rate_limit_cleanup_task(
            state.rate_limits.iter().map(RateLimitRule::limiter).collect(),
            Duration::from_secs(config.security.rate_limit_cleanup_interval_secs.max(1)),
        )
    });

    let app = routes::create_app(state);

    // Configure CORS layer
    let cors_layer = if config.server.allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    let app = if config.server.cors_enabled {
        app.layer(cors_layer)
    } else {
        app
    };
    let app = app.layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
    .await?;

    if let Some(handle) = cleanup_handle {
        handle.abort();
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM) and handle graceful shutdown
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        // Log error but continue waiting - this is a best-effort signal handler
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    info!("Waiting up to {:?} for connections to close...", timeout);
}
