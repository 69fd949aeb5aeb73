//! API error handling
//!
//! Every failure leaves the API as `{ "error": <message>, "code": <CODE> }`,
//! optionally with `details`. Messages are the texts clients display.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use expensegenie_auth::AuthError;
use expensegenie_db::DbError;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request errors
    // =========================================================================
    #[error("{0}")]
    BadRequest(String),

    /// 400 carrying an extra `details` string
    #[error("{message}")]
    BadRequestDetails { message: String, details: String },

    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body")]
    InvalidRequestBody,

    #[error("Method not allowed")]
    MethodNotAllowed,

    // =========================================================================
    // Authentication errors
    // =========================================================================
    #[error("{0}")]
    Unauthorized(String),

    #[error("Please verify your email address before logging in. Check your inbox for the 6-digit verification code.")]
    EmailNotVerified { email: String },

    // =========================================================================
    // Resource errors
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // =========================================================================
    // Internal errors
    // =========================================================================
    /// The message is safe for clients; the cause has already been logged
    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Log `cause` and return a 500 with `message`
    pub fn internal(message: &str, cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "{}", message);
        Self::Internal(message.to_string())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) | Self::BadRequestDetails { .. } => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidRequestBody => "INVALID_REQUEST_BODY",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::EmailNotVerified { .. } => "EMAIL_NOT_VERIFIED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_)
            | Self::BadRequestDetails { .. }
            | Self::Validation(_)
            | Self::InvalidRequestBody => StatusCode::BAD_REQUEST,

            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,

            Self::EmailNotVerified { .. } => StatusCode::FORBIDDEN,

            Self::NotFound(_) => StatusCode::NOT_FOUND,

            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            Self::Conflict(_) => StatusCode::CONFLICT,

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Stable machine-readable code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Set on the unverified-login response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_not_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Copied from `x-request-id` by the request-id middleware
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let mut response = Self {
            error: err.to_string(),
            code: err.error_code().to_string(),
            details: None,
            email_not_verified: None,
            email: None,
            request_id: None,
        };
        match err {
            ApiError::BadRequestDetails { details, .. } => {
                response.details = Some(details.clone());
            }
            ApiError::EmailNotVerified { email } => {
                response.email_not_verified = Some(true);
                response.email = Some(email.clone());
            }
            _ => {}
        }
        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired => {
                Self::Unauthorized(err.to_string())
            }
            AuthError::InvalidCredentials | AuthError::PasswordVerificationFailed => {
                Self::Unauthorized(AuthError::InvalidCredentials.to_string())
            }
            AuthError::WeakPassword(message) => Self::BadRequest(message),
            AuthError::PasswordHashingFailed | AuthError::Config(_) | AuthError::Internal(_) => {
                Self::internal("An internal error occurred", &err)
            }
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Duplicate(msg) => Self::Conflict(msg),
            _ => Self::internal("Database error", &err),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(format_validation_errors(&err))
    }
}

/// First message of each failed field, joined
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::EmailNotVerified { email: "a@b.co".into() }.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_unverified_body() {
        let body = serde_json::to_value(ErrorResponse::from(&ApiError::EmailNotVerified {
            email: "a@b.co".into(),
        }))
        .unwrap();

        assert_eq!(body["emailNotVerified"], true);
        assert_eq!(body["email"], "a@b.co");
        assert_eq!(body["code"], "EMAIL_NOT_VERIFIED");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn test_details_only_when_present() {
        let err = ApiError::BadRequestDetails {
            message: "Could not find pricing information. Please enter the amount manually.".into(),
            details: "timeout".into(),
        };
        let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
        assert_eq!(body["details"], "timeout");
        assert_eq!(
            body["error"],
            "Could not find pricing information. Please enter the amount manually."
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        let err = ApiError::from(AuthError::TokenExpired);
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");

        let err = ApiError::from(AuthError::WeakPassword("Password must be at least 6 characters".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_db_duplicate_is_conflict() {
        let err = ApiError::from(DbError::Duplicate("Email or username already in use".into()));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
