//! Password hashing with Argon2id.
//!
//! Everything is stored as a PHC string, so the parameters and salt ride
//! along with each hash and verification needs no extra configuration.

use argon2::password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};

/// Hash a plaintext password into a PHC string.
pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    // Argon2id, default parameters.
    let hashed = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hashed.to_string())
}

/// Check a plaintext password against a stored PHC hash.
///
/// A mismatch is `Ok(false)`, not an error; anything else wrong with the
/// stored hash (truncated, unknown algorithm) propagates.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, password_hash::Error> {
    let stored = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &stored) {
        Err(password_hash::Error::Password) => Ok(false),
        other => other.map(|()| true),
    }
}

/// Minimum-strength gate applied before hashing at registration.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.len() >= min_length {
        return Ok(());
    }
    Err(format!(
        "Password must be at least {min_length} characters long"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let hash = hash_password("window-seat-please-7A").unwrap();
        assert!(hash.starts_with("$argon2id$"), "PHC id missing: {hash}");
        assert!(verify_password("window-seat-please-7A", &hash).unwrap());
    }

    #[test]
    fn wrong_password_is_a_clean_false() {
        let hash = hash_password("the-real-password").unwrap();
        assert!(!verify_password("a-guess", &hash).unwrap());
    }

    #[test]
    fn malformed_stored_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }

    #[test]
    fn minimum_length_is_enforced() {
        assert!(validate_password_strength("short", 8).is_err());
        assert!(validate_password_strength("12345678", 8).is_ok());

        let msg = validate_password_strength("tiny", 8).unwrap_err();
        assert!(msg.contains("at least 8 characters"), "got: {msg}");
    }
}
