//! Password hashing and verification.
//!
//! bcrypt carries its own salt and cost inside the hash string, so the
//! stored hash is the only input verification needs.

use bcrypt::{DEFAULT_COST, hash, verify};
use tracing::warn;

use crate::auth::error::AuthError;

/// Cost factor used when none is configured.
pub const BCRYPT_COST: u32 = DEFAULT_COST;

/// Longest password accepted, in bytes. bcrypt ignores everything past it.
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Check a plaintext password against a stored bcrypt hash.
///
/// Returns `false` for a wrong password, for one longer than
/// [`MAX_PASSWORD_LENGTH`], and for a hash bcrypt cannot parse.
/// A wrong password is an expected outcome, so it is never an error.
pub fn verify_password(stored_hash: &str, supplied: &str) -> bool {
    if supplied.len() > MAX_PASSWORD_LENGTH {
        return false;
    }

    match verify(supplied, stored_hash) {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Stored password hash could not be verified: {}", e);
            false
        }
    }
}

/// [`verify_password`] on the blocking pool.
///
/// bcrypt is deliberately slow; running it inline would stall the runtime
/// worker serving other requests.
pub async fn verify_password_blocking(stored_hash: &str, supplied: &str) -> bool {
    let stored_hash = stored_hash.to_string();
    let supplied = supplied.to_string();

    tokio::task::spawn_blocking(move || verify_password(&stored_hash, &supplied))
        .await
        .unwrap_or(false)
}

/// Hash a password with a fresh salt on the blocking pool.
///
/// Passwords longer than [`MAX_PASSWORD_LENGTH`] are refused rather than
/// truncated.
pub async fn hash_password(password: &str, cost: Option<u32>) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::internal(format!(
            "password exceeds {} bytes",
            MAX_PASSWORD_LENGTH
        )));
    }

    let password = password.to_string();
    let cost = cost.unwrap_or(BCRYPT_COST);

    tokio::task::spawn_blocking(move || hash(password, cost).map_err(AuthError::internal))
        .await
        .map_err(|e| AuthError::internal(format!("hashing task failed: {}", e)))?
}
