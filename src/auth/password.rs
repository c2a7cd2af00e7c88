use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Argon2id with the crate's default cost. Salt and parameters travel inside
/// the returned PHC string, so verification needs nothing else.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| anyhow!("argon2 hashing failed: {e}"))
}

/// `Ok(false)` on mismatch. `Err` means the stored value is not a PHC
/// string at all, which points at a corrupt row rather than a bad login.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let phc = PasswordHash::new(stored)
        .map_err(|e| anyhow!("stored password hash unreadable: {e}"))?;
    match Argon2::default().verify_password(plain.as_bytes(), &phc) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("argon2 verification failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_is_phc_and_verifies() {
        let hash = hash_password("signup-secret").unwrap();
        assert_ne!(hash, "signup-secret");
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("signup-secret"));
        assert!(verify_password("signup-secret", &hash).unwrap());
    }

    #[test]
    fn mismatch_is_false_not_error() {
        let hash = hash_password("signup-secret").unwrap();
        assert!(!verify_password("Signup-secret", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn each_hash_gets_its_own_salt() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same-password", &a).unwrap());
        assert!(verify_password("same-password", &b).unwrap());
    }

    #[test]
    fn unreadable_stored_hash_is_error() {
        let err = verify_password("anything", "plaintext-in-db").unwrap_err();
        assert!(err.to_string().contains("unreadable"));
    }
}
