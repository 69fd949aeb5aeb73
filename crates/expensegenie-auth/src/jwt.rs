//! JWT Token Service
//!
//! One token per login, valid for the configured lifetime (a day by
//! default). There is no refresh token and no revocation list; a user who
//! wants a new token logs in again.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::types::{AccessToken, AuthenticatedUser, TokenClaims};

/// JWT service for token management
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign a token for `user_id`
    pub fn issue(&self, user_id: Uuid, username: &str, email: &str) -> AuthResult<AccessToken> {
        let now = Utc::now();
        let expires_at = now
            + Duration::from_std(self.config.token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.config.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))?;

        Ok(AccessToken { token, expires_at })
    }

    /// Decode and validate a token
    pub fn validate(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    /// Validate a token and build the caller identity from its claims
    pub fn authenticate(&self, token: &str) -> AuthResult<AuthenticatedUser> {
        let claims = self.validate(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
            email: claims.email,
        })
    }

    /// Token lifetime from the config
    pub fn token_lifetime(&self) -> std::time::Duration {
        self.config.token_lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            token_lifetime: std::time::Duration::from_secs(86_400),
            issuer: "test-issuer".to_string(),
        }
    }

    #[test]
    fn test_issue_and_authenticate() {
        let service = JwtService::new(test_config());
        let user_id = Uuid::new_v4();

        let issued = service.issue(user_id, "maria", "maria@example.com").unwrap();
        assert!(!issued.token.is_empty());

        let lifetime = issued.expires_at - Utc::now();
        assert!(lifetime > Duration::hours(23) && lifetime <= Duration::days(1));

        let user = service.authenticate(&issued.token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "maria");
        assert_eq!(user.email, "maria@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtService::new(test_config());
        let other = JwtService::new(JwtConfig {
            secret: "a-completely-different-secret-value!!".to_string(),
            ..test_config()
        });

        let issued = issuer.issue(Uuid::new_v4(), "u", "u@example.com").unwrap();
        assert_eq!(other.validate(&issued.token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_wrong_issuer_is_rejected() {
        let issuer = JwtService::new(test_config());
        let other = JwtService::new(JwtConfig {
            issuer: "someone-else".to_string(),
            ..test_config()
        });

        let issued = issuer.issue(Uuid::new_v4(), "u", "u@example.com").unwrap();
        assert!(other.validate(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(test_config());
        let now = Utc::now();
        let claims = TokenClaims {
            sub: Uuid::new_v4().to_string(),
            username: "u".into(),
            email: "u@example.com".into(),
            iat: (now - Duration::days(2)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
            iss: "test-issuer".into(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert_eq!(service.validate(&token).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new(test_config());
        assert_eq!(
            service.validate("invalid-token").unwrap_err(),
            AuthError::InvalidToken
        );
    }
}
