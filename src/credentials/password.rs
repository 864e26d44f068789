use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::config::HashConfig;
use crate::error::StoreError;

fn hasher(config: &HashConfig) -> Result<Argon2<'static>, StoreError> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        None,
    )
    .map_err(|e| {
        error!(error = %e, "invalid argon2 params");
        StoreError::Hashing(e.to_string())
    })?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password with a freshly generated salt.
///
/// Cost parameters come from the caller's config rather than a global
/// constant, so they are visible at every call site.
pub fn hash_password(plain: &str, config: &HashConfig) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = hasher(config)?;
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            StoreError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext candidate against a stored PHC hash string.
///
/// A wrong password is `Ok(false)`; only a malformed stored hash errors.
/// The parameters encoded in the hash itself drive verification, so hashes
/// written under older cost settings keep verifying.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, StoreError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        StoreError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
