//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Invalid user identifier
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    /// Invalid session identifier
    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Session", "s1");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Session");
                assert_eq!(id, "s1");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("User", "u1");
        assert_eq!(err.to_string(), "User not found: u1");
    }

    #[test]
    fn invalid_user_id_message() {
        let err = DomainError::InvalidUserId("must not be empty".to_string());
        assert_eq!(err.to_string(), "Invalid user id: must not be empty");
    }

    #[test]
    fn invalid_session_id_message() {
        let err = DomainError::InvalidSessionId("too long".to_string());
        assert_eq!(err.to_string(), "Invalid session id: too long");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("field is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: field is required");
    }
}
