//! Password hashing and verification.
//!
//! New hashes are salted Argon2id PHC strings. Databases written by earlier
//! versions hold bare hex SHA-256 digests; those still verify, and callers
//! are told to upgrade them.

use crate::{Error, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};

/// Outcome of checking a password against a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// Matches a current Argon2 hash
    Match,
    /// Matches a legacy unsalted digest; the hash should be replaced
    LegacyMatch,
    Mismatch,
}

impl PasswordCheck {
    pub fn is_match(self) -> bool {
        !matches!(self, PasswordCheck::Mismatch)
    }
}

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::PasswordHash(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash of either format
pub fn verify_password(password: &str, stored: &str) -> Result<PasswordCheck> {
    if is_legacy_digest(stored) {
        let matches = legacy_digest(password).eq_ignore_ascii_case(stored);
        return Ok(if matches {
            PasswordCheck::LegacyMatch
        } else {
            PasswordCheck::Mismatch
        });
    }

    let parsed = PasswordHash::new(stored)
        .map_err(|e| Error::PasswordHash(format!("parse stored hash: {e}")))?;

    // Verification uses the parameters embedded in the hash
    Ok(
        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => PasswordCheck::Match,
            Err(_) => PasswordCheck::Mismatch,
        },
    )
}

fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn is_legacy_digest(stored: &str) -> bool {
    stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit())
}
