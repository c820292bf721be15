//! Password hashing and verification using Argon2id.
//!
//! Hashes use OWASP-recommended parameters (memory: 19 MiB,
//! iterations: 2, parallelism: 1) with a random salt per hash. Both
//! operations are deliberately slow; async callers go through the
//! `*_blocking` variants so the work runs on tokio's blocking pool.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::AuthError;

fn hasher() -> Result<Argon2<'static>, AuthError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

/// Hash a plaintext password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `false` for a mismatch and for a malformed hash alike, so
/// callers cannot tell the two apart.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = argon2::PasswordHash::new(hash) else {
        tracing::warn!("stored password hash is malformed");
        return false;
    };

    // Parameters are read from the PHC string itself.
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Crypto(format!("hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool.
///
/// Errors only if the blocking task itself could not complete.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Crypto(format!("verification task failed: {e}")))
}
