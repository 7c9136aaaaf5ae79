//! Typed token payload.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{TokenId, UserId};

/// Claims carried by every token this service issues.
///
/// Decoding into this struct is the whole of claim validation: a missing
/// `principal` or `exp`, or one of the wrong type, fails the decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// The user this token authenticates
    pub principal: UserId,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token id, mirrored in the session registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<TokenId>,
}

impl TokenClaims {
    /// Claims for `principal` valid from `now` for `ttl`, with a fresh `jti`.
    pub fn new(principal: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            principal,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Some(TokenId::generate()),
        }
    }

    /// Whether `now` is past the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_window() {
        let now = Utc::now();
        let claims = TokenClaims::new(UserId::new("u1"), now, Duration::hours(24));

        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
        assert!(claims.jti.is_some());
        assert!(!claims.is_expired_at(now));
        assert!(!claims.is_expired_at(now + Duration::hours(24)));
        assert!(claims.is_expired_at(now + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn test_claims_wire_names() {
        let json = r#"{"principal": "u1", "iat": 10, "exp": 20, "jti": "t1"}"#;
        let claims: TokenClaims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.principal, UserId::new("u1"));
        assert_eq!(claims.exp, 20);
        assert_eq!(claims.jti, Some(TokenId::new("t1")));
    }

    #[test]
    fn test_claims_require_principal_and_exp() {
        assert!(serde_json::from_str::<TokenClaims>(r#"{"iat": 10, "exp": 20}"#).is_err());
        assert!(serde_json::from_str::<TokenClaims>(r#"{"principal": "u1", "iat": 10}"#).is_err());
        assert!(
            serde_json::from_str::<TokenClaims>(r#"{"principal": 7, "iat": 10, "exp": 20}"#)
                .is_err()
        );
        assert!(
            serde_json::from_str::<TokenClaims>(r#"{"principal": "u1", "iat": 10, "exp": "soon"}"#)
                .is_err()
        );
    }
}
