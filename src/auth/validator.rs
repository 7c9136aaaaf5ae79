//! Bearer token validation.
//!
//! Every protected request goes through [`TokenValidator::authenticate`]:
//!
//! 1. the `Authorization` header must carry `Bearer <token>`
//! 2. the header algorithm must be HS256 and the signature must verify
//! 3. the payload must decode into [`TokenClaims`] and be unexpired
//! 4. the principal must still exist in the user directory
//!
//! Any failure is a single `Unauthorized` outcome. Nothing is retried.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Validation, decode, decode_header};
use sha2::{Digest, Sha256};
use tracing::{debug, error, warn};

use crate::auth::claims::TokenClaims;
use crate::auth::context::AuthContext;
use crate::auth::directory::UserDirectory;
use crate::auth::error::AuthError;
use crate::auth::keys::{SigningKeys, TOKEN_ALGORITHM};

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Verifies inbound tokens and resolves them to an [`AuthContext`].
#[derive(Clone)]
pub struct TokenValidator {
    keys: Arc<SigningKeys>,
    users: Arc<dyn UserDirectory>,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: Arc<SigningKeys>, users: Arc<dyn UserDirectory>) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            keys,
            users,
            validation,
        }
    }

    /// Authenticate a request from its raw `Authorization` header value.
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = extract_bearer(authorization).inspect_err(|e| {
            warn!("Rejected request: {}", e);
        })?;
        let claims = self.verify(token).inspect_err(|e| {
            warn!("Rejected token {}: {}", fingerprint(token), e);
        })?;

        // Strict mode: a token for a deleted account is no longer honored.
        let user = match self.users.find_user_by_id(&claims.principal).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(
                    "Rejected token {}: principal {} not found",
                    fingerprint(token),
                    claims.principal
                );
                return Err(AuthError::unauthorized("unknown principal"));
            }
            Err(e) => {
                error!(
                    "Principal lookup failed for token {}: {}",
                    fingerprint(token),
                    e
                );
                return Err(AuthError::unauthorized("principal lookup failed"));
            }
        };

        debug!("Token verified for principal {}", user.user_id);
        Ok(AuthContext::new(user.user_id, user.username, claims.jti))
    }

    /// Check signature, algorithm, and expiry; return the typed claims.
    ///
    /// Needs no storage round trip.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        // Checked up front so the log says why; `decode` would also refuse it.
        let header = decode_header(token)
            .map_err(|e| AuthError::unauthorized(format!("malformed token: {}", e)))?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(AuthError::unauthorized(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let data = decode::<TokenClaims>(token, self.keys.decoding(), &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::unauthorized("token expired"),
                ErrorKind::InvalidSignature => AuthError::unauthorized("invalid signature"),
                ErrorKind::InvalidAlgorithm => AuthError::unauthorized("unexpected signing algorithm"),
                _ => AuthError::unauthorized(format!("invalid token: {}", e)),
            },
        )?;

        let claims = data.claims;

        if claims.is_expired_at(Utc::now()) {
            return Err(AuthError::unauthorized("token expired"));
        }

        Ok(claims)
    }
}

/// Pull the token out of an `Authorization` header value.
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let header = authorization.ok_or_else(|| AuthError::unauthorized("missing authorization header"))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthError::unauthorized("authorization header is not a bearer token"))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::unauthorized("empty bearer token"));
    }

    Ok(token)
}

/// Short, non-reversible handle for a token, safe to put in logs.
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..6].iter().map(|b| format!("{:02x}", b)).collect()
}
