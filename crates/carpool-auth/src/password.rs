//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings with a random 16-byte salt.
//! An account without a hash has an unusable password and never verifies.

use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::error::{Error, Result};

/// Hashes and verifies account passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a hasher with the default Argon2id parameters.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PasswordHash`] if salt encoding or hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);

        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::PasswordHash(e.to_string()))?;

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::PasswordHash(e.to_string()))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// `None` stands for an unusable password and always yields `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PasswordHash`] if the stored hash is not a valid PHC
    /// string.
    pub fn verify(&self, password: &str, hash: Option<&str>) -> Result<bool> {
        let Some(hash) = hash else {
            return Ok(false);
        };

        let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("carpool-secret").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("carpool-secret", Some(&hash)).unwrap());
        assert!(!hasher.verify("wrong-secret", Some(&hash)).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("same").unwrap();
        let second = hasher.hash("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("", None).unwrap());
        assert!(!hasher.verify("anything", None).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = PasswordHasher::new();
        let result = hasher.verify("secret", Some("not-a-phc-string"));
        assert!(matches!(result, Err(Error::PasswordHash(_))));
    }
}
