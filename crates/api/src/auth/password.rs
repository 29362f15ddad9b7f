//! Argon2id password hashing and the minimum password policy.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use beacon_core::error::CoreError;

/// Shortest password accepted when creating or resetting a user.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Hash `password` into a PHC string (algorithm, params and salt embedded).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `Ok(false)` on a mismatch; `Err` only when `stored` is not a PHC string.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject passwords shorter than [`MIN_PASSWORD_LENGTH`] characters or made
/// only of whitespace.
pub fn check_password_policy(password: &str) -> Result<(), CoreError> {
    if password.trim().is_empty() {
        return Err(CoreError::Validation("Password must not be blank".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("quarterly-report-2025").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("quarterly-report-2025", &hash).unwrap());
        assert!(!verify_password("quarterly-report-2024", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn policy_checks_length_in_characters() {
        assert_matches!(check_password_policy("short"), Err(CoreError::Validation(_)));
        assert_matches!(
            check_password_policy("            "),
            Err(CoreError::Validation(_))
        );
        assert!(check_password_policy("exactly-12ch").is_ok());
        // 12 multi-byte characters pass even though they are more bytes.
        assert!(check_password_policy("ääääääääääää").is_ok());
    }
}
