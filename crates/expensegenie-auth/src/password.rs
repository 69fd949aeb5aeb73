//! Password Service
//!
//! Argon2id hashing with an optional pepper appended to the password.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use zeroize::Zeroizing;

use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};

/// Password service for hashing and verification
#[derive(Clone)]
pub struct PasswordService {
    config: PasswordConfig,
}

impl PasswordService {
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    fn peppered(&self, password: &str) -> Zeroizing<String> {
        match self.config.pepper {
            Some(ref pepper) => Zeroizing::new(format!("{}{}", password, pepper)),
            None => Zeroizing::new(password.to_string()),
        }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.validate_password_strength(password)?;

        let password = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            Some(self.config.hash_length as usize),
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashingFailed)?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash. A mismatch is `Ok(false)`.
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let password = self.peppered(password);

        let parsed_hash =
            PasswordHash::new(hash).map_err(|_| AuthError::PasswordVerificationFailed)?;

        // Parameters come from the PHC string, not from the config
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::PasswordVerificationFailed),
        }
    }

    pub fn validate_password_strength(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(())
    }

    pub fn min_password_length(&self) -> usize {
        self.config.min_password_length
    }
}
