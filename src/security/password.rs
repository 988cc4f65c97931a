use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use once_cell::sync::Lazy;
use rand::rngs::OsRng;
use thiserror::Error;

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(|| {
    let params = Params::new(19 * 1024, 2, 1, None).expect("params");
    Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params)
});

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hash error: {0}")]
    Hash(String),
}

pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    ARGON2
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::Hash(e.to_string()))?;
    Ok(ARGON2.verify_password(plain.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correct horse battery").expect("hash should succeed");
        assert!(verify_password("correct horse battery", &hash).expect("verify should succeed"));
        assert!(!verify_password("wrong password", &hash).expect("verify should succeed"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
