//! Authentication handlers: login, refresh, logout, password change
//!
//! Every handler that issues a token also sets it as the JWT cookie
//! (`HttpOnly`, `SameSite=Strict`, `Secure` in production).

use application::ports::IssuedToken;
use axum::{Json, extract::State};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use domain::{EmailAddress, Session};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    error::ApiError,
    middleware::{AuthenticatedSession, ValidatedJson},
    state::AppState,
};

/// Login request body
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Password change request body
#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, max = 128, message = "Current password is required"))]
    pub current_password: String,
    #[validate(
        length(min = 8, max = 128, message = "Password must be 8 to 128 characters"),
        custom(function = "crate::middleware::validate_password_strength")
    )]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords don't match"))]
    pub confirm_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// A freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub session_id: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

impl TokenResponse {
    fn from_issued(issued: &IssuedToken) -> Self {
        Self {
            token: issued.token.clone(),
            token_type: "Bearer".to_string(),
            session_id: issued.session_id.to_string(),
            expires_in: issued.expires_in(Utc::now()),
        }
    }
}

/// Logout result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub invalidated_sessions: usize,
}

/// One active session of the current user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub current: bool,
}

/// The validated token and the user's active sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    pub user_id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub active_sessions: Vec<SessionSummary>,
}

fn auth_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .path("/")
        .build()
}

fn removal_cookie(name: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = auth_cookie(name, String::new(), secure);
    cookie.make_removal();
    cookie
}

fn with_token_cookie(state: &AppState, jar: CookieJar, issued: &IssuedToken) -> CookieJar {
    jar.add(auth_cookie(
        &state.config.security.jwt_cookie_name,
        issued.token.clone(),
        state.secure_cookies(),
    ))
}

/// Exchange credentials for a token bound to a new session
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let email =
        EmailAddress::new(request.email).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let issued = state.tokens.issue_for_login(&email, &request.password).await?;

    let jar = with_token_cookie(&state, jar, &issued);
    Ok((jar, Json(TokenResponse::from_issued(&issued))))
}

/// Rotate the presented token onto a new session
#[instrument(skip_all, fields(user_id = %session.token.user_id))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    session: AuthenticatedSession,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let issued = state.tokens.refresh_token(&session.raw_token).await?;

    let jar = with_token_cookie(&state, jar, &issued);
    Ok((jar, Json(TokenResponse::from_issued(&issued))))
}

/// End every session of the current user and clear the auth cookies
#[instrument(skip_all, fields(user_id = %session.token.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: AuthenticatedSession,
) -> (CookieJar, Json<LogoutResponse>) {
    let invalidated = state.tokens.logout(&session.token.user_id);
    info!(invalidated_sessions = invalidated, "User logged out");

    let security = &state.config.security;
    let secure = state.secure_cookies();
    let jar = jar
        .add(removal_cookie(&security.jwt_cookie_name, secure))
        .add(removal_cookie(&security.session_cookie_name, secure));

    (
        jar,
        Json(LogoutResponse {
            success: true,
            invalidated_sessions: invalidated,
        }),
    )
}

/// Change the password and replace every session with a new one
#[instrument(skip_all, fields(user_id = %session.token.user_id))]
pub async fn change_password(
    State(state): State<AppState>,
    jar: CookieJar,
    session: AuthenticatedSession,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<TokenResponse>), ApiError> {
    let issued = state
        .tokens
        .handle_password_change(
            &session.token.user_id,
            &request.current_password,
            &request.new_password,
        )
        .await?;

    let jar = with_token_cookie(&state, jar, &issued);
    Ok((jar, Json(TokenResponse::from_issued(&issued))))
}

/// Describe the current session
pub async fn session_info(
    State(state): State<AppState>,
    session: AuthenticatedSession,
) -> Json<SessionInfoResponse> {
    let token = session.token;
    let active_sessions = state
        .sessions
        .active_sessions(&token.user_id)
        .into_iter()
        .map(|s: Session| SessionSummary {
            current: s.id == token.session_id,
            session_id: s.id.to_string(),
            created_at: s.created_at,
        })
        .collect();

    Json(SessionInfoResponse {
        user_id: token.user_id.to_string(),
        session_id: token.session_id.to_string(),
        issued_at: token.issued_at,
        expires_at: token.expires_at,
        active_sessions,
    })
}
