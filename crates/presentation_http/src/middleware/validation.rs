//! Request validation
//!
//! Provides a `ValidatedJson` extractor that validates request bodies using the
//! validator crate, plus the password strength rule shared by request types.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

/// Password strength rule: upper, lower, digit and special character
///
/// Length is checked separately with `length(min = 8, max = 128)`.
pub fn validate_password_strength(password: &str) -> Result<(), validator::ValidationError> {
    let rules: [(fn(char) -> bool, &'static str, &'static str); 4] = [
        (
            |c| c.is_ascii_uppercase(),
            "password_uppercase",
            "Password must contain at least one uppercase letter",
        ),
        (
            |c| c.is_ascii_lowercase(),
            "password_lowercase",
            "Password must contain at least one lowercase letter",
        ),
        (
            |c| c.is_ascii_digit(),
            "password_digit",
            "Password must contain at least one number",
        ),
        (
            |c| !c.is_ascii_alphanumeric(),
            "password_special",
            "Password must contain at least one special character",
        ),
    ];

    for (check, code, message) in rules {
        if !password.chars().any(check) {
            return Err(validator::ValidationError::new(code).with_message(message.into()));
        }
    }
    Ok(())
}

/// Rejection of a request body by [`ValidatedJson`]
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Body is not JSON of the expected shape
    #[error("Invalid JSON: {0}")]
    MalformedJson(#[from] JsonRejection),
    /// Body parsed but broke one or more field rules
    #[error("Validation failed: {0}")]
    InvalidFields(String),
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        let message = match self {
            Self::MalformedJson(e) => e.body_text(),
            Self::InvalidFields(msg) => msg,
        };

        let body = serde_json::json!({
            "error": message,
            "code": "validation_error"
        });

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// One `field: message` entry per broken rule, ordered by field name
fn describe(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                format!("{field}: {message}")
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// JSON body extractor that runs the body's `validator` rules
///
/// Malformed JSON and rule violations both answer 400 with
/// `code: "validation_error"`, before the handler runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value
            .validate()
            .map_err(|e| ValidationError::InvalidFields(describe(&e)))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, routing::post};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::handlers::auth::{ChangePasswordRequest, LoginRequest};

    async fn accept_login(ValidatedJson(req): ValidatedJson<LoginRequest>) -> String {
        req.email
    }

    async fn accept_password_change(
        ValidatedJson(_): ValidatedJson<ChangePasswordRequest>,
    ) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/auth/login", post(accept_login))
            .route("/auth/password", post(accept_password_change))
    }

    async fn post_raw(uri: &str, body: impl Into<Body>) -> (StatusCode, Option<Value>) {
        let response = app()
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).ok())
    }

    async fn post_json(uri: &str, body: &Value) -> (StatusCode, Option<Value>) {
        post_raw(uri, body.to_string()).await
    }

    fn assert_rejected(result: (StatusCode, Option<Value>), field: &str) {
        let (status, body) = result;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body.unwrap();
        assert_eq!(body["code"], "validation_error");
        assert!(
            body["error"].as_str().unwrap().contains(field),
            "{body} should mention {field}"
        );
    }

    #[tokio::test]
    async fn valid_login_passes() {
        let (status, _) = post_json(
            "/auth/login",
            &json!({ "email": "owner@example.com", "password": "Old-Passw0rd!" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn login_with_bad_email_is_rejected() {
        let result = post_json(
            "/auth/login",
            &json!({ "email": "not-an-email", "password": "Old-Passw0rd!" }),
        )
        .await;

        assert_rejected(result, "email: Invalid email format");
    }

    #[tokio::test]
    async fn login_with_empty_password_is_rejected() {
        let result = post_json(
            "/auth/login",
            &json!({ "email": "owner@example.com", "password": "" }),
        )
        .await;

        assert_rejected(result, "password: Password is required");
    }

    #[tokio::test]
    async fn valid_password_change_passes() {
        let (status, _) = post_json(
            "/auth/password",
            &json!({
                "current_password": "Old-Passw0rd!",
                "new_password": "New-Passw0rd!",
                "confirm_password": "New-Passw0rd!",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_rejected() {
        let result = post_json(
            "/auth/password",
            &json!({
                "current_password": "Old-Passw0rd!",
                "new_password": "New-Passw0rd!",
                "confirm_password": "New-Passw0rd?",
            }),
        )
        .await;

        assert_rejected(result, "confirm_password: Passwords don't match");
    }

    #[tokio::test]
    async fn weak_new_password_is_rejected() {
        let result = post_json(
            "/auth/password",
            &json!({
                "current_password": "Old-Passw0rd!",
                "new_password": "new-passw0rd!",
                "confirm_password": "new-passw0rd!",
            }),
        )
        .await;

        assert_rejected(result, "new_password: Password must contain at least one uppercase letter");
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let (status, body) = post_raw("/auth/login", r#"{"email": not json}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.unwrap()["code"], "validation_error");
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let (status, body) = post_json("/auth/login", &json!({ "email": "owner@example.com" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.unwrap()["code"], "validation_error");
    }

    #[test]
    fn strong_password_passes() {
        assert!(validate_password_strength("C0rrect-Horse").is_ok());
    }

    #[test]
    fn each_missing_class_is_reported() {
        let cases = [
            ("c0rrect-horse", "password_uppercase"),
            ("C0RRECT-HORSE", "password_lowercase"),
            ("Correct-Horse", "password_digit"),
            ("C0rrectHorse", "password_special"),
        ];
        for (password, code) in cases {
            let err = validate_password_strength(password).unwrap_err();
            assert_eq!(err.code, code, "{password}");
        }
    }
}
