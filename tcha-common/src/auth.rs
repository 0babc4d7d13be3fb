//! Password hashing and session tokens
//!
//! Passwords are stored as Argon2id PHC strings (`$argon2id$v=19$...`), which
//! carry their own random salt and cost parameters. Verification goes through
//! the Argon2 verifier, which compares digests in constant time. Session
//! tokens are random 256-bit values in hex; only their SHA-256 digest is
//! persisted, so a leaked database does not leak live tokens.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies; the axum extractor lives in tcha-server.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Number of random bytes in a password salt
const SALT_BYTES: usize = 16;

/// Number of random bytes in a session token
const TOKEN_BYTES: usize = 32;

/// Generate a random bearer token as hex
pub fn generate_token() -> String {
    random_hex(TOKEN_BYTES)
}

/// Hash a password into a PHC string with a fresh salt
///
/// # Examples
///
/// ```
/// use tcha_common::auth::{hash_password, verify_password};
///
/// let hash = hash_password("secret").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("secret", &hash));
/// assert!(!verify_password("Secret", &hash));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| Error::Internal(format!("Failed to encode password salt: {}", e)))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC string
///
/// A stored value that does not parse never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Digest of a session token as stored in the `sessions` table
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
