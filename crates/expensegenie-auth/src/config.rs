//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Bearer token configuration
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
    /// Verification code and link token lifetimes
    #[serde(default)]
    pub codes: CodeConfig,
}

impl AuthConfig {
    /// Config with the given secret and argon2 costs low enough for tests
    pub fn for_tests(secret: impl Into<String>) -> Self {
        Self {
            jwt: JwtConfig {
                secret: secret.into(),
                ..JwtConfig::default()
            },
            password: PasswordConfig::low_cost(),
            codes: CodeConfig::default(),
        }
    }
}

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret for signing tokens
    pub secret: String,
    /// Token lifetime
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set
            token_lifetime: Duration::from_secs(24 * 60 * 60),
            issuer: "expensegenie".to_string(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Additional server-side secret appended before hashing
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

impl PasswordConfig {
    /// Minimum argon2 costs; only for tests
    pub fn low_cost() -> Self {
        Self {
            memory_cost: 8,
            time_cost: 1,
            ..Self::default()
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
            min_password_length: 6,
        }
    }
}

/// Lifetimes of the one-time secrets sent by email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    /// 6-digit email verification code
    #[serde(with = "humantime_serde")]
    pub verification_code_lifetime: Duration,
    /// Email verification link token
    #[serde(with = "humantime_serde")]
    pub verification_token_lifetime: Duration,
    /// Password reset link token
    #[serde(with = "humantime_serde")]
    pub reset_token_lifetime: Duration,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            verification_code_lifetime: Duration::from_secs(15 * 60),
            verification_token_lifetime: Duration::from_secs(24 * 60 * 60),
            reset_token_lifetime: Duration::from_secs(60 * 60),
        }
    }
}
