//! Password hashing module
//!
//! Secure password hashing and verification using Argon2id with the
//! argon2 crate's default parameters and a random salt per hash.
//! Hashes are stored in PHC string format.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with secure defaults.
///
/// Returns the hash in PHC string format (algorithm, parameters, salt
/// and hash in one string).
///
/// # Example
///
/// ```ignore
/// use parley::services::password::hash_password;
///
/// let hash = hash_password("my_secure_password")?;
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Returns `true` if the password matches, `false` if it does not.
///
/// # Errors
///
/// Returns an error if the stored hash is not a valid PHC string.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e)),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// For any password: the stored hash differs from the input, the
        /// correct password verifies, a different password does not, and
        /// two hashes of the same password differ (random salt).
        #[test]
        fn property_password_storage_roundtrip(
            password in "[a-zA-Z0-9!@#$%^&*()_+-=]{1,50}"
        ) {
            let hash = hash_password(&password).expect("Password hashing should succeed");

            prop_assert_ne!(&hash, &password);
            prop_assert!(hash.starts_with("$argon2id$"));

            let ok = verify_password(&password, &hash)
                .expect("Password verification should not error");
            prop_assert!(ok, "Correct password should verify");

            let wrong = format!("{}wrong", password);
            let not_ok = verify_password(&wrong, &hash)
                .expect("Password verification should not error");
            prop_assert!(!not_ok, "Wrong password should not verify");

            let hash2 = hash_password(&password).expect("Second hashing should succeed");
            prop_assert_ne!(hash, hash2, "Salts should differ between hashes");
        }
    }
}
