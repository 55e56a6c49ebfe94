//! Credential checks and hashing shared by the store backends

use bento_api::Credentials;
use bento_util::SessionToken;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{StoreError, StoreResult};

/// Lowercase and trim an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check registration input before an account is created
pub fn validate_registration(credentials: &Credentials, min_password_length: usize) -> StoreResult<()> {
    let email = normalize_email(&credentials.email);
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed {
        return Err(StoreError::Validation(format!(
            "'{}' is not a valid email address",
            credentials.email.trim()
        )));
    }

    if credentials.password.chars().count() < min_password_length {
        return Err(StoreError::Validation(format!(
            "password must be at least {} characters",
            min_password_length
        )));
    }

    Ok(())
}

/// Fresh random salt for a new account
pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Salted SHA256 hex digest of a password
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest under which a session token is stored
pub fn hash_token(token: &SessionToken) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn registration_rules() {
        assert!(validate_registration(&Credentials::new("ada@example.com", "secret"), 6).is_ok());
        assert!(matches!(
            validate_registration(&Credentials::new("ada", "secret"), 6),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            validate_registration(&Credentials::new("@example.com", "secret"), 6),
            Err(StoreError::Validation(_))
        ));
        assert!(matches!(
            validate_registration(&Credentials::new("ada@example.com", "short"), 6),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn password_hash_depends_on_salt() {
        let a = hash_password("salt-a", "secret");
        let b = hash_password("salt-b", "secret");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "secret"));
        assert_eq!(a.len(), 64);
    }
}
