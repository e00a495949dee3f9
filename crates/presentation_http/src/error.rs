//! API error handling
//!
//! Provides sanitized error responses that don't leak implementation details.
//! In production mode, internal errors return generic messages without details.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::error;

/// Global flag to control error detail exposure
/// Set to false in production to prevent information leakage
static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

const GENERIC_ERROR: &str = "An error occurred processing your request";

/// Configure whether internal error details should be exposed in responses.
///
/// In production environments, this should be set to `false` to prevent
/// leaking implementation details, stack traces, or sensitive information.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::SeqCst);
}

/// Check if internal error details should be exposed
fn should_expose_details() -> bool {
    EXPOSE_INTERNAL_ERRORS.load(Ordering::SeqCst)
}

/// Sanitize an error message to remove potentially sensitive information
///
/// Removes file paths, connection strings and stack trace fragments.
fn sanitize_error_message(msg: &str, expose: bool) -> String {
    if expose {
        return msg.to_string();
    }
    sanitize_for_production(msg)
}

fn sanitize_for_production(msg: &str) -> String {
    let sensitive_patterns = [
        // File paths
        "/home/",
        "/users/",
        "/var/",
        "/etc/",
        "\\users\\",
        "c:\\",
        // Connection strings
        "postgres://",
        "postgresql://",
        "sqlite://",
        "mysql://",
        "mongodb://",
        "redis://",
        // Stack trace indicators
        "at line",
        "stack backtrace",
        "panicked at",
        " at ",
        ".rs:",
        // Connection details
        "connection refused",
        "econnrefused",
        "timeout",
    ];

    let msg_lower = msg.to_lowercase();
    if sensitive_patterns.iter().any(|p| msg_lower.contains(p)) {
        return GENERIC_ERROR.to_string();
    }

    if msg.contains("://") || msg.contains('/') && msg.len() > 50 {
        return GENERIC_ERROR.to_string();
    }

    msg.to_string()
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.render(should_expose_details())
    }
}

impl ApiError {
    fn render(self, expose: bool) -> Response {
        let status = self.status();
        let (code, message, details) = match self {
            Self::BadRequest(msg) => ("bad_request", sanitize_error_message(&msg, expose), None),
            Self::Unauthorized(msg) => {
                // Generic in production to prevent user enumeration
                let sanitized = if expose {
                    msg
                } else {
                    "Authentication required".to_string()
                };
                ("unauthorized", sanitized, None)
            },
            Self::Forbidden(msg) => {
                let sanitized = if expose {
                    msg
                } else {
                    "Access denied".to_string()
                };
                ("forbidden", sanitized, None)
            },
            // Configured throttling message, always shown verbatim
            Self::RateLimited(msg) => ("rate_limited", msg, None),
            Self::PayloadTooLarge { limit } => (
                "payload_too_large",
                format!("Request body exceeds {limit} bytes"),
                None,
            ),
            Self::Internal(msg) => {
                error!(error = %msg, "Internal error");
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    expose.then_some(msg),
                )
            },
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Domain(e) => Self::BadRequest(e.to_string()),
            ApplicationError::InvalidToken(msg) => Self::Unauthorized(msg),
            e @ (ApplicationError::TokenExpired
            | ApplicationError::SessionInvalidated
            | ApplicationError::TokenInvalidated
            | ApplicationError::UserNotFound
            | ApplicationError::UserDeactivated
            | ApplicationError::InvalidCredentials) => Self::Unauthorized(e.to_string()),
            ApplicationError::RateLimited => {
                Self::RateLimited("Too many requests. Please try again later.".to_string())
            },
            ApplicationError::PayloadTooLarge { limit } => Self::PayloadTooLarge { limit },
            ApplicationError::NotAuthorized(msg) => Self::Forbidden(msg),
            ApplicationError::Configuration(msg) | ApplicationError::Internal(msg) => {
                Self::Internal(msg)
            },
        }
    }
}
