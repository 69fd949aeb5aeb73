//! Authentication errors
//!
//! Messages for the bearer-token cases are the exact texts returned to the
//! client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    #[error("Unauthorized: No token provided")]
    MissingToken,

    /// Bad signature, wrong issuer or unparseable token
    #[error("Unauthorized: Invalid token")]
    InvalidToken,

    #[error("Unauthorized: Invalid token")]
    TokenExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Password hashing failed")]
    PasswordHashingFailed,

    #[error("Password verification failed")]
    PasswordVerificationFailed,

    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::WeakPassword(_) => 400,

            Self::MissingToken
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::InvalidCredentials
            | Self::PasswordVerificationFailed => 401,

            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken => "UNAUTHENTICATED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials | Self::PasswordVerificationFailed => "INVALID_CREDENTIALS",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Config(_) | Self::PasswordHashingFailed => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error body written by the auth layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Machine-readable code
    pub code: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.client_message(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::MissingToken.status_code(), 401);
        assert_eq!(AuthError::TokenExpired.status_code(), 401);
        assert_eq!(AuthError::WeakPassword("short".into()).status_code(), 400);
        assert_eq!(AuthError::Internal("boom".into()).status_code(), 500);
    }

    #[test]
    fn test_bearer_messages() {
        assert_eq!(
            AuthError::MissingToken.to_string(),
            "Unauthorized: No token provided"
        );
        assert_eq!(AuthError::TokenExpired.to_string(), "Unauthorized: Invalid token");
        assert_eq!(AuthError::InvalidToken.to_string(), "Unauthorized: Invalid token");
    }

    #[test]
    fn test_client_message_hides_internal_details() {
        let err = AuthError::Internal("argon2 params rejected".to_string());
        assert_eq!(err.client_message(), "An internal error occurred");

        let body = ErrorResponse::from(&err);
        assert_eq!(body.code, "INTERNAL_ERROR");
    }
}
