//! Argon2id password hashing, verification, and strength validation.
//!
//! Hashes are stored as PHC strings in the `password` field of `users`
//! documents. Accounts created before hashing was introduced still hold a
//! plain password there; see [`matches_stored`].

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use trainlog_core::session::ARGON2_PREFIX;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check `password` against a stored value that is either an Argon2 hash
/// or a legacy plain password.
pub fn matches_stored(password: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    if stored.starts_with(ARGON2_PREFIX) {
        verify_password(password, stored)
    } else {
        Ok(password == stored)
    }
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("squat-rack").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"), "expected argon2id PHC prefix");
        assert!(verify_password("squat-rack", &hash).expect("verify should succeed"));
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("real-password").expect("hashing should succeed");
        let verified = verify_password("wrong-password", &hash).expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_legacy_plain_password_compares_verbatim() {
        assert!(matches_stored("1234", "1234").unwrap());
        assert!(!matches_stored("12345", "1234").unwrap());
    }

    #[test]
    fn test_hashed_stored_value_is_verified() {
        let hash = hash_password("deadlift").unwrap();
        assert!(matches_stored("deadlift", &hash).unwrap());
        // The hash itself is not a valid password.
        assert!(!matches_stored(&hash, &hash).unwrap());
    }

    #[test]
    fn test_password_too_short() {
        let msg = validate_password_strength("abc", MIN_PASSWORD_LENGTH).unwrap_err();
        assert!(msg.contains("at least 4 characters"));
        assert!(validate_password_strength("abcd", MIN_PASSWORD_LENGTH).is_ok());
    }
}
