//! ExpenseGenie Authentication Layer
//!
//! - **Bearer tokens**: HS256 JWTs carrying the user id, username and email
//! - **Passwords**: Argon2id with an optional pepper
//! - **Email verification / reset**: 6-digit codes and hashed link tokens
//!
//! # Architecture
//!
//! ```text
//! Request → AuthLayer → Handler
//!              │
//!              ▼
//!         JwtService ──► AuthenticatedUser (request extension)
//! ```
//!
//! Only protected routes sit behind [`AuthLayer`]; `/api/auth` is public.

pub mod codes;
pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod types;

pub use codes::{CodeIssuer, IssuedCode, IssuedToken};
pub use config::{AuthConfig, CodeConfig, JwtConfig, PasswordConfig};
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::JwtService;
pub use middleware::{AuthLayer, AuthMiddleware, RequireAuth};
pub use password::PasswordService;
pub use types::*;

use std::sync::Arc;

/// Main authentication service combining all auth components
#[derive(Clone)]
pub struct AuthService {
    pub jwt: Arc<JwtService>,
    pub password: PasswordService,
    pub codes: CodeIssuer,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(config.jwt.clone())),
            password: PasswordService::new(config.password.clone()),
            codes: CodeIssuer::new(config.codes.clone()),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an auth layer for the protected Axum routes
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.jwt.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_auth_service_wiring() {
        let service = AuthService::new(AuthConfig::for_tests("wiring-test-secret-0123456789"));

        let hash = service.password.hash_password("secret1").unwrap();
        assert!(service.password.verify_password("secret1", &hash).unwrap());

        let issued = service.jwt.issue(Uuid::new_v4(), "u", "u@example.com").unwrap();
        assert!(service.jwt.validate(&issued.token).is_ok());
        assert_eq!(service.config().password.memory_cost, 8);
    }
}
