//! Argon2id implementation of the password hashing seam.

use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};

use gatekeeper_rbac::{HashError, PasswordHasher};

/// Argon2id with the crate's default parameters and a fresh random salt per hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = password_hash::PasswordHasher::hash_password(&Argon2::default(), plain.as_bytes(), &salt)
            .map_err(|e| HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hashed).map_err(|e| HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
