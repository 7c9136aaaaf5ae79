//! Authentication and authorization errors.

use std::fmt;

/// Outcome of a failed authentication or authorization step.
///
/// The `String` payloads are reasons for the server log. They are never
/// sent to the client; the HTTP layer maps each variant to a fixed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, malformed, forged, or expired token, or unknown principal
    Unauthorized(String),
    /// Authenticated, but not entitled to the resource
    Forbidden(String),
    /// Login with an unknown username or a wrong password
    InvalidCredentials,
    /// Signing, hashing, or storage failure
    Internal(String),
}

impl AuthError {
    pub(crate) fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized(reason.into())
    }

    pub(crate) fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    pub(crate) fn internal(cause: impl fmt::Display) -> Self {
        Self::Internal(cause.to_string())
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized(reason) => write!(f, "Unauthorized: {}", reason),
            Self::Forbidden(reason) => write!(f, "Forbidden: {}", reason),
            Self::InvalidCredentials => write!(f, "Invalid username or password"),
            Self::Internal(cause) => write!(f, "Internal error: {}", cause),
        }
    }
}

impl std::error::Error for AuthError {}
