//! Password hashing for user accounts
//!
//! Passwords are stored as SHA-256 over `salt || password`, both hex-encoded.
//! Pure functions only; storage lives in [`crate::db::users`].

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salt length in bytes
const SALT_LEN: usize = 16;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Generate a random hex-encoded salt
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    to_hex(&salt)
}

/// Hash a password with the given salt
///
/// ```
/// use shelf_common::auth::hash_password;
///
/// let a = hash_password("secret", "00ff");
/// assert_eq!(a.len(), 64);
/// assert_eq!(a, hash_password("secret", "00ff"));
/// assert_ne!(a, hash_password("secret", "ff00"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    to_hex(&hasher.finalize())
}

/// Check a password against a stored hash
///
/// Compares every byte regardless of where the first mismatch is.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    if calculated.len() != expected_hash.len() {
        return false;
    }
    calculated
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
