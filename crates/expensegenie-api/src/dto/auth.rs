//! Authentication DTOs
//!
//! Every field is optional so that missing input is reported with the
//! handler's own message rather than a deserialization error.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// `/api/auth` query string
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AuthQuery {
    /// signup | login | verify-email | resend-verification | forgot-password | reset-password
    pub action: Option<String>,
    /// Verification code (GET verify-email)
    pub code: Option<String>,
    /// Verification link token (GET verify-email)
    pub token: Option<String>,
}

// =============================================================================
// Signup
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignupResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub message: String,
}

// =============================================================================
// Login
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token, valid for one day
    pub token: String,
    pub username: String,
    pub email: String,
}

// =============================================================================
// Email verification
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    /// 6-digit code from the email
    pub code: Option<String>,
    /// Token from the verification link
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyEmailResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Body of resend-verification and forgot-password
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: Option<String>,
}

// =============================================================================
// Password reset
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}
