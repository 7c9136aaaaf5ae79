//! Ownership checks on mailbox operations.

use std::fmt;

use tracing::warn;

use crate::auth::context::AuthContext;
use crate::auth::error::AuthError;
use crate::types::UserId;

/// Which side of a mailbox operation the caller claims to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Sending as the declared sender
    Send,
    /// Reading the mailbox of the requested recipient
    Read,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => write!(f, "send"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Allow the operation only when the authenticated principal owns it.
///
/// Takes an [`AuthContext`], which only the validator can produce, so this
/// cannot be evaluated against an unauthenticated request.
pub fn authorize(ctx: &AuthContext, owner: &UserId, access: Access) -> Result<(), AuthError> {
    if ctx.principal() == owner {
        return Ok(());
    }

    warn!(
        "Denied {} for principal {} on mailbox owned by {}",
        access,
        ctx.principal(),
        owner
    );

    Err(match access {
        Access::Send => AuthError::forbidden("sender does not match authenticated principal"),
        Access::Read => AuthError::forbidden("mailbox does not belong to authenticated principal"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Username;

    fn alice() -> AuthContext {
        AuthContext::new(UserId::new("alice-id"), Username::new("alice"), None)
    }

    #[test]
    fn test_owner_allowed() {
        let owner = UserId::new("alice-id");
        assert!(authorize(&alice(), &owner, Access::Send).is_ok());
        assert!(authorize(&alice(), &owner, Access::Read).is_ok());
    }

    #[test]
    fn test_spoofed_sender_forbidden() {
        let err = authorize(&alice(), &UserId::new("bob-id"), Access::Send).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[test]
    fn test_foreign_mailbox_forbidden() {
        let err = authorize(&alice(), &UserId::new("bob-id"), Access::Read).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[test]
    fn test_comparison_is_exact() {
        assert!(authorize(&alice(), &UserId::new("ALICE-ID"), Access::Read).is_err());
        assert!(authorize(&alice(), &UserId::new("alice-id "), Access::Read).is_err());
    }
}
