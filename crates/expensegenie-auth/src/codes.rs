//! Verification codes and link tokens
//!
//! Codes are 6 random digits in `[100000, 999999]`. Link tokens are 32
//! random bytes, hex encoded; only their SHA-256 digest is stored. Issuing
//! a new code or token overwrites the previous one, so only the latest is
//! ever valid.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

use crate::config::CodeConfig;
use crate::error::{AuthError, AuthResult};

const TOKEN_BYTES: usize = 32;

/// A code to email together with its expiry
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// A link token. `token` goes in the email; `digest` goes in the database.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues codes and tokens with the configured lifetimes
#[derive(Clone)]
pub struct CodeIssuer {
    config: CodeConfig,
}

impl CodeIssuer {
    pub fn new(config: CodeConfig) -> Self {
        Self { config }
    }

    pub fn verification_code(&self, now: DateTime<Utc>) -> AuthResult<IssuedCode> {
        Ok(IssuedCode {
            code: generate_code(),
            expires_at: now + lifetime(self.config.verification_code_lifetime)?,
        })
    }

    pub fn verification_token(&self, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        issue_token(now, self.config.verification_token_lifetime)
    }

    pub fn reset_token(&self, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        issue_token(now, self.config.reset_token_lifetime)
    }
}

fn lifetime(duration: std::time::Duration) -> AuthResult<Duration> {
    Duration::from_std(duration).map_err(|e| AuthError::Config(e.to_string()))
}

fn issue_token(now: DateTime<Utc>, ttl: std::time::Duration) -> AuthResult<IssuedToken> {
    let token = generate_token();
    Ok(IssuedToken {
        digest: token_digest(&token),
        token,
        expires_at: now + lifetime(ttl)?,
    })
}

/// Uniform 6-digit code
pub fn generate_code() -> String {
    OsRng.gen_range(100_000u32..1_000_000).to_string()
}

/// 32 random bytes as 64 lowercase hex characters
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 of a link token, hex encoded
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Exactly six ASCII digits
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_code_range() {
        for _ in 0..1000 {
            let code = generate_code();
            assert!(is_valid_code_format(&code), "{code}");
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn test_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(generate_token(), token);
    }

    #[test]
    fn test_lifetimes() {
        let issuer = CodeIssuer::new(CodeConfig::default());

        let code = issuer.verification_code(t0()).unwrap();
        assert_eq!(code.expires_at, t0() + Duration::minutes(15));

        let token = issuer.verification_token(t0()).unwrap();
        assert_eq!(token.expires_at, t0() + Duration::hours(24));
        assert_eq!(token.digest, token_digest(&token.token));

        let reset = issuer.reset_token(t0()).unwrap();
        assert_eq!(reset.expires_at, t0() + Duration::hours(1));
    }

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("482913"));
        assert!(!is_valid_code_format("48291"));
        assert!(!is_valid_code_format("4829134"));
        assert!(!is_valid_code_format("48a913"));
        assert!(!is_valid_code_format("４８２９１３"));
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(token_digest("abc"), token_digest("abc"));
        assert_ne!(token_digest("abc"), token_digest("abd"));
        assert_eq!(token_digest("abc").len(), 64);
    }
}
