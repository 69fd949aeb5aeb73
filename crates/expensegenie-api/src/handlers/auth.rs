//! Authentication Handlers
//!
//! All account flows share one endpoint, `/api/auth`; the `action` query
//! parameter selects the operation. Every flow other than `verify-email`
//! is POST-only.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use regex::Regex;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use expensegenie_auth::codes::{is_valid_code_format, token_digest};
use expensegenie_db::{DbError, DbUser, NewUser, VerificationSecrets};

use crate::dto::{
    present, AuthQuery, EmailRequest, LoginRequest, LoginResponse, MessageResponse,
    ResetPasswordRequest, SignupRequest, SignupResponse, VerifyEmailRequest, VerifyEmailResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::parse_lenient;
use crate::state::AppState;

const SIGNUP_FAILED: &str = "Server error during signup";
const LOGIN_FAILED: &str = "Server error during login";
const VERIFY_FAILED: &str = "Server error during verification";
const RESEND_FAILED: &str = "Server error during resend";
const FORGOT_FAILED: &str = "Server error during password reset request";
const RESET_FAILED: &str = "Server error during password reset";

const INVALID_EMAIL: &str = "Invalid email format";
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUPLICATE_ACCOUNT: &str = "Email or username already in use";
const MIN_USERNAME_LENGTH: usize = 3;

/// Sub-operations of `/api/auth`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Signup,
    Login,
    VerifyEmail,
    ResendVerification,
    ForgotPassword,
    ResetPassword,
}

impl FromStr for AuthAction {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "signup" => Ok(Self::Signup),
            "login" => Ok(Self::Login),
            "verify-email" => Ok(Self::VerifyEmail),
            "resend-verification" => Ok(Self::ResendVerification),
            "forgot-password" => Ok(Self::ForgotPassword),
            "reset-password" => Ok(Self::ResetPassword),
            _ => Err(ApiError::BadRequest("Invalid action".to_string())),
        }
    }
}

/// Account endpoint
#[utoipa::path(
    post,
    path = "/api/auth",
    tag = "Authentication",
    params(AuthQuery),
    request_body(content = Object, description = "Fields depend on the action"),
    responses(
        (status = 200, description = "Action completed", body = MessageResponse),
        (status = 201, description = "Account created", body = SignupResponse),
        (status = 400, description = "Invalid input or action", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Email not verified", body = crate::error::ErrorResponse),
        (status = 405, description = "Method not allowed", body = crate::error::ErrorResponse),
        (status = 409, description = "Email or username already in use", body = crate::error::ErrorResponse)
    )
)]
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<AuthQuery>,
    body: Bytes,
) -> ApiResult<Response> {
    let action: AuthAction = query.action.as_deref().unwrap_or_default().parse()?;

    if method == Method::GET && action == AuthAction::VerifyEmail {
        let request = VerifyEmailRequest {
            code: query.code,
            token: query.token,
        };
        return verify_email(&state, request).await;
    }
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    match action {
        AuthAction::Signup => signup(&state, parse_lenient(&body)?).await,
        AuthAction::Login => login(&state, parse_lenient(&body)?).await,
        AuthAction::VerifyEmail => verify_email(&state, parse_lenient(&body)?).await,
        AuthAction::ResendVerification => resend_verification(&state, parse_lenient(&body)?).await,
        AuthAction::ForgotPassword => forgot_password(&state, parse_lenient(&body)?).await,
        AuthAction::ResetPassword => reset_password(&state, parse_lenient(&body)?).await,
    }
}

async fn signup(state: &AppState, request: SignupRequest) -> ApiResult<Response> {
    let password = request.password.as_deref().filter(|p| !p.is_empty());
    let (Some(username), Some(email), Some(password)) =
        (present(&request.username), present(&request.email), password)
    else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };

    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest(INVALID_EMAIL.to_string()));
    }
    state.auth.password.validate_password_strength(password)?;
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LENGTH
        )));
    }

    let existing = state
        .db
        .users
        .find_by_email_or_username(&email, username)
        .await
        .map_err(|e| ApiError::internal(SIGNUP_FAILED, e))?;
    if existing.is_some() {
        return Err(ApiError::Conflict(DUPLICATE_ACCOUNT.to_string()));
    }

    let password_hash = state
        .auth
        .password
        .hash_password(password)
        .map_err(|e| ApiError::internal(SIGNUP_FAILED, e))?;
    // Signup emails carry the code only
    let (verification, _) =
        issue_verification(state).map_err(|e| ApiError::internal(SIGNUP_FAILED, e))?;
    let code = verification.code.clone();

    let user = state
        .db
        .users
        .create(NewUser {
            username: username.to_string(),
            email,
            password_hash,
            verification,
        })
        .await
        .map_err(|e| match e {
            DbError::Duplicate(_) => ApiError::Conflict(DUPLICATE_ACCOUNT.to_string()),
            other => ApiError::internal(SIGNUP_FAILED, other),
        })?;

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    // The account exists either way; a failed email can be re-sent later
    if let Err(e) = state
        .email
        .send_verification_code(&user.email, &user.username, &code, code_minutes(state))
        .await
    {
        tracing::warn!(user_id = %user.id, error = %e, "Verification email not sent");
    }

    let response = SignupResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        message: "Account created successfully. Please check your email to verify your account."
            .to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn login(state: &AppState, request: LoginRequest) -> ApiResult<Response> {
    let password = request.password.as_deref().filter(|p| !p.is_empty());
    let (Some(email), Some(password)) = (present(&request.email), password) else {
        return Err(ApiError::BadRequest("Missing email or password".to_string()));
    };
    let email = normalize_email(email);

    let user = state
        .db
        .users
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILED, e))?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let valid = state
        .auth
        .password
        .verify_password(password, &user.password_hash)
        .unwrap_or(false);
    if !valid {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.is_email_verified {
        return Err(ApiError::EmailNotVerified { email: user.email });
    }

    let token = state
        .auth
        .jwt
        .issue(user.id, &user.username, &user.email)
        .map_err(|e| ApiError::internal(LOGIN_FAILED, e))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: token.token,
        username: user.username,
        email: user.email,
    })
    .into_response())
}

async fn verify_email(state: &AppState, request: VerifyEmailRequest) -> ApiResult<Response> {
    let now = Utc::now();

    let user = match (present(&request.code), present(&request.token)) {
        (Some(code), _) => {
            if !is_valid_code_format(code) {
                return Err(ApiError::BadRequest(
                    "Invalid code format. Code must be 6 digits.".to_string(),
                ));
            }
            state
                .db
                .users
                .find_by_verification_code(code, now)
                .await
                .map_err(|e| ApiError::internal(VERIFY_FAILED, e))?
                .ok_or_else(|| {
                    ApiError::BadRequest(
                        "Invalid or expired verification code. Please request a new verification code."
                            .to_string(),
                    )
                })?
        }
        (None, Some(token)) => state
            .db
            .users
            .find_by_verification_token(&token_digest(token), now)
            .await
            .map_err(|e| ApiError::internal(VERIFY_FAILED, e))?
            .ok_or_else(|| {
                ApiError::BadRequest(
                    "Invalid or expired verification token. Please request a new verification email."
                        .to_string(),
                )
            })?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "Verification code or token is required".to_string(),
            ))
        }
    };

    if user.is_email_verified {
        return Ok(Json(VerifyEmailResponse {
            message: "Email already verified. You can now log in.".to_string(),
            verified: None,
        })
        .into_response());
    }

    state
        .db
        .users
        .mark_verified(user.id)
        .await
        .map_err(|e| ApiError::internal(VERIFY_FAILED, e))?;

    tracing::info!(user_id = %user.id, "Email verified");

    Ok(Json(VerifyEmailResponse {
        message: "Email verified successfully! You can now log in.".to_string(),
        verified: Some(true),
    })
    .into_response())
}

async fn resend_verification(state: &AppState, request: EmailRequest) -> ApiResult<Response> {
    let Some(email) = present(&request.email) else {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    };
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest(INVALID_EMAIL.to_string()));
    }

    let Some(user) = find_account(state, &email, RESEND_FAILED).await? else {
        return Ok(message(
            "If an account exists with this email, a verification email has been sent.",
        ));
    };
    if user.is_email_verified {
        return Err(ApiError::BadRequest(
            "Email is already verified. You can log in now.".to_string(),
        ));
    }

    let (secrets, token) =
        issue_verification(state).map_err(|e| ApiError::internal(RESEND_FAILED, e))?;
    let code = secrets.code.clone();
    state
        .db
        .users
        .set_verification(user.id, secrets)
        .await
        .map_err(|e| ApiError::internal(RESEND_FAILED, e))?;

    state
        .email
        .send_verification(&user.email, &user.username, &code, &token, code_minutes(state))
        .await
        .map_err(|e| {
            ApiError::internal("Failed to send verification email. Please try again later.", e)
        })?;

    Ok(message(
        "Verification email sent successfully. Please check your inbox.",
    ))
}

async fn forgot_password(state: &AppState, request: EmailRequest) -> ApiResult<Response> {
    let Some(email) = present(&request.email) else {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    };
    let email = normalize_email(email);

    let Some(user) = find_account(state, &email, FORGOT_FAILED).await? else {
        return Ok(message(
            "If an account exists with this email, a password reset link has been sent.",
        ));
    };

    let reset = state
        .auth
        .codes
        .reset_token(Utc::now())
        .map_err(|e| ApiError::internal(FORGOT_FAILED, e))?;
    state
        .db
        .users
        .set_reset_token(user.id, &reset.digest, reset.expires_at)
        .await
        .map_err(|e| ApiError::internal(FORGOT_FAILED, e))?;

    state
        .email
        .send_password_reset(&user.email, &user.username, &reset.token)
        .await
        .map_err(|e| ApiError::internal("Failed to send reset email. Please try again later.", e))?;

    tracing::info!(user_id = %user.id, "Password reset requested");

    Ok(message(
        "Password reset instructions have been sent to your email.",
    ))
}

async fn reset_password(state: &AppState, request: ResetPasswordRequest) -> ApiResult<Response> {
    let password = request.password.as_deref().filter(|p| !p.is_empty());
    let (Some(token), Some(password)) = (present(&request.token), password) else {
        return Err(ApiError::BadRequest(
            "Token and password are required".to_string(),
        ));
    };
    state.auth.password.validate_password_strength(password)?;

    let user = state
        .db
        .users
        .find_by_reset_token(&token_digest(token), Utc::now())
        .await
        .map_err(|e| ApiError::internal(RESET_FAILED, e))?
        .ok_or_else(|| {
            ApiError::BadRequest(
                "Invalid or expired reset token. Please request a new password reset.".to_string(),
            )
        })?;

    let password_hash = state
        .auth
        .password
        .hash_password(password)
        .map_err(|e| ApiError::internal(RESET_FAILED, e))?;
    state
        .db
        .users
        .reset_password(user.id, &password_hash)
        .await
        .map_err(|e| ApiError::internal(RESET_FAILED, e))?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(message(
        "Password has been reset successfully. You can now log in with your new password.",
    ))
}

// =============================================================================
// Helpers
// =============================================================================

async fn find_account(state: &AppState, email: &str, failure: &str) -> ApiResult<Option<DbUser>> {
    state
        .db
        .users
        .find_by_email(email)
        .await
        .map_err(|e| ApiError::internal(failure, e))
}

/// Fresh code plus link token; the plain token is returned for the email
fn issue_verification(
    state: &AppState,
) -> Result<(VerificationSecrets, String), expensegenie_auth::AuthError> {
    let now = Utc::now();
    let code = state.auth.codes.verification_code(now)?;
    let token = state.auth.codes.verification_token(now)?;

    Ok((
        VerificationSecrets {
            code: code.code,
            code_expires: code.expires_at,
            token_hash: token.digest,
            token_expires: token.expires_at,
        },
        token.token,
    ))
}

fn code_minutes(state: &AppState) -> i64 {
    (state.auth.config().codes.verification_code_lifetime.as_secs() / 60) as i64
}

fn message(text: &str) -> Response {
    Json(MessageResponse::new(text)).into_response()
}

/// Emails are compared trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
        .is_match(email)
}
