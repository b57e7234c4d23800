//! Password hashing and verification.
//!
//! Passwords are pre-digested with SHA-256 before being fed to bcrypt.
//! The digest gives every input a fixed 64-character hex form, which keeps
//! hashing cost independent of the input length and stays well under
//! bcrypt's 72-byte input limit.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{DEFAULT_COST, hash, verify};
use sha2::{Digest, Sha256};

/// One-way salted hashing for stored credentials.
pub struct PasswordHasher;

impl PasswordHasher {
    /// SHA-256 digest of the raw password, hex encoded.
    fn pre_hash(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hashes a password for storage.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if the underlying bcrypt call fails.
    pub fn hash_password(password: &str) -> ServiceResult<String> {
        let pre_hashed = Self::pre_hash(password);
        hash(pre_hashed, DEFAULT_COST)
            .map_err(|e| ServiceError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verifies a password against the stored hash.
    ///
    /// Returns `false` for a mismatch or a malformed stored hash; this
    /// function never fails.
    pub fn verify_password(password: &str, hashed: &str) -> bool {
        let pre_hashed = Self::pre_hash(password);
        verify(pre_hashed, hashed).unwrap_or(false)
    }
}
