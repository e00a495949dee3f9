//! HS256 JWT implementation of the token codec port
//!
//! Tokens carry `userId`, `sessionId`, `iat` and `exp`. Decoding verifies
//! the signature only; expiry is left to the token validator so an expired
//! token is reported as expired rather than as malformed.

use application::{
    error::ApplicationError,
    ports::{IssuedToken, RawTokenClaims, TokenCodecPort},
};
use chrono::{Duration, Utc};
use domain::{SessionId, UserId};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default token lifetime in seconds (1 hour)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(rename = "sessionId", default, skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Signs and verifies HS256 bearer tokens with a shared secret
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenCodec")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl JwtTokenCodec {
    /// Create a codec from a shared secret and token lifetime
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Lifetime of minted tokens
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl TokenCodecPort for JwtTokenCodec {
    fn decode(&self, token: &str) -> Result<RawTokenClaims, ApplicationError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(error = %e, "Token verification failed");
            ApplicationError::InvalidToken("Invalid token format".to_string())
        })?;

        let claims = data.claims;
        Ok(RawTokenClaims {
            user_id: claims.user_id,
            session_id: claims.session_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    fn mint(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
    ) -> Result<IssuedToken, ApplicationError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            warn!(ttl_secs = self.ttl.num_seconds(), "Token lifetime out of range");
            ApplicationError::Internal("Token lifetime out of range".to_string())
        })?;
        let claims = JwtClaims {
            user_id: Some(user_id.to_string()),
            session_id: Some(session_id.to_string()),
            iat: Some(now.timestamp()),
            exp: Some(expires_at.timestamp()),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            warn!(error = %e, "Failed to encode token");
            ApplicationError::Internal("Token creation failed".to_string())
        })?;

        Ok(IssuedToken {
            token,
            session_id: session_id.clone(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(ttl_secs: i64) -> JwtTokenCodec {
        JwtTokenCodec::new(
            &SecretString::from("test-secret-that-is-long-enough-for-hs256"),
            Duration::seconds(ttl_secs),
        )
    }

    fn ids() -> (UserId, SessionId) {
        (UserId::new("u1").unwrap(), SessionId::new("s1").unwrap())
    }

    #[test]
    fn minted_token_decodes_to_its_claims() {
        let codec = codec(DEFAULT_TOKEN_TTL_SECS);
        let (user, session) = ids();

        let issued = codec.mint(&user, &session).unwrap();
        let claims = codec.decode(&issued.token).unwrap();

        assert_eq!(claims.user_id.as_deref(), Some("u1"));
        assert_eq!(claims.session_id.as_deref(), Some("s1"));
        assert_eq!(claims.expires_at, Some(issued.expires_at.timestamp()));
        assert!(claims.issued_at.is_some());
    }

    #[test]
    fn expired_tokens_still_decode() {
        let codec = codec(-120);
        let (user, session) = ids();

        let issued = codec.mint(&user, &session).unwrap();
        let claims = codec.decode(&issued.token).unwrap();

        assert!(claims.expires_at.unwrap() < Utc::now().timestamp());
    }

    #[test]
    fn wrong_secret_is_invalid_token() {
        let (user, session) = ids();
        let issued = codec(60).mint(&user, &session).unwrap();

        let other = JwtTokenCodec::new(
            &SecretString::from("a-completely-different-signing-secret"),
            Duration::seconds(60),
        );
        let err = other.decode(&issued.token).unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidToken(_)));
    }

    #[test]
    fn out_of_range_lifetime_fails_instead_of_panicking() {
        let codec = JwtTokenCodec::new(
            &SecretString::from("test-secret-that-is-long-enough-for-hs256"),
            Duration::MAX,
        );
        let (user, session) = ids();

        let err = codec.mint(&user, &session).unwrap_err();
        assert!(matches!(err, ApplicationError::Internal(_)));
    }

    #[test]
    fn garbage_is_invalid_token() {
        let err = codec(60).decode("not.a.jwt").unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidToken(_)));
    }

    #[test]
    fn tokens_without_session_claim_decode_with_none() {
        let codec = codec(60);
        let claims = JwtClaims {
            user_id: Some("u1".into()),
            session_id: None,
            iat: None,
            exp: Some(Utc::now().timestamp() + 60),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &codec.encoding).unwrap();

        let decoded = codec.decode(&token).unwrap();
        assert!(decoded.session_id.is_none());
    }

    #[test]
    fn claim_names_are_camel_case() {
        let claims = JwtClaims {
            user_id: Some("u1".into()),
            session_id: Some("s1".into()),
            iat: Some(1),
            exp: Some(2),
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"userId":"u1","sessionId":"s1","iat":1,"exp":2}"#);
    }
}
