//! Token issuance.

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{Header, encode};
use tracing::{debug, error};

use crate::auth::claims::TokenClaims;
use crate::auth::directory::SessionRegistry;
use crate::auth::error::AuthError;
use crate::auth::keys::{SigningKeys, TOKEN_ALGORITHM};
use crate::db::schema::SessionRecord;
use crate::types::UserId;

/// Default token lifetime in hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Longest token lifetime the issuer accepts, in hours.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// A freshly signed token and the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Mints signed, fixed-lifetime tokens for authenticated principals.
#[derive(Clone)]
pub struct TokenIssuer {
    keys: Arc<SigningKeys>,
    ttl: Duration,
    sessions: Option<Arc<dyn SessionRegistry>>,
}

impl TokenIssuer {
    pub fn new(keys: Arc<SigningKeys>) -> Self {
        Self {
            keys,
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
            sessions: None,
        }
    }

    /// Override the token lifetime. Must be positive and at most
    /// [`MAX_TOKEN_TTL_HOURS`].
    pub fn with_ttl(mut self, ttl: Duration) -> Result<Self, AuthError> {
        if ttl <= Duration::zero() || ttl > Duration::hours(MAX_TOKEN_TTL_HOURS) {
            return Err(AuthError::internal(format!(
                "token lifetime of {}s is out of range",
                ttl.num_seconds()
            )));
        }

        self.ttl = ttl;
        Ok(self)
    }

    /// Record every issued token in `registry` before handing it out.
    pub fn with_session_registry(mut self, registry: Arc<dyn SessionRegistry>) -> Self {
        self.sessions = Some(registry);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a principal whose credentials were just verified.
    ///
    /// With a session registry configured, the session record is persisted
    /// first; if that fails no token is returned.
    pub async fn issue(&self, principal: &UserId) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims::new(principal.clone(), Utc::now(), self.ttl);

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, self.keys.encoding())
            .map_err(|e| {
                error!("Token signing failed for {}: {}", principal, e);
                AuthError::internal("token signing failed")
            })?;

        if let (Some(registry), Some(token_id)) = (&self.sessions, &claims.jti) {
            let session = SessionRecord {
                token_id: token_id.clone(),
                user_id: principal.clone(),
                issued_at: claims.iat,
                expires_at: claims.exp,
            };

            registry.create_session(&session).await.map_err(|e| {
                error!("Failed to persist session for {}: {}", principal, e);
                AuthError::internal("session could not be recorded")
            })?;
        }

        debug!("Issued token for {} (expires at {})", principal, claims.exp);
        Ok(IssuedToken { token, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::directory::StoreFuture;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRegistry {
        sessions: Mutex<Vec<SessionRecord>>,
    }

    impl SessionRegistry for RecordingRegistry {
        fn create_session<'a>(&'a self, session: &'a SessionRecord) -> StoreFuture<'a, ()> {
            self.sessions.lock().unwrap().push(session.clone());
            Box::pin(async { Ok(()) })
        }
    }

    struct FailingRegistry;

    impl SessionRegistry for FailingRegistry {
        fn create_session<'a>(&'a self, _session: &'a SessionRecord) -> StoreFuture<'a, ()> {
            Box::pin(async { Err(anyhow::anyhow!("disk full")) })
        }
    }

    fn keys() -> Arc<SigningKeys> {
        Arc::new(SigningKeys::from_secret(b"issuer-test-secret").unwrap())
    }

    #[tokio::test]
    async fn test_issue_builds_three_segment_token() {
        let issuer = TokenIssuer::new(keys());
        let issued = issuer.issue(&UserId::new("u1")).await.unwrap();

        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.claims.principal, UserId::new("u1"));
        assert_eq!(
            issued.claims.exp - issued.claims.iat,
            DEFAULT_TOKEN_TTL_HOURS * 3600
        );
    }

    #[tokio::test]
    async fn test_custom_ttl() {
        let issuer = TokenIssuer::new(keys()).with_ttl(Duration::minutes(5)).unwrap();
        let issued = issuer.issue(&UserId::new("u1")).await.unwrap();

        assert_eq!(issued.claims.exp - issued.claims.iat, 300);
    }

    #[test]
    fn test_ttl_out_of_range_rejected() {
        for ttl in [
            Duration::zero(),
            Duration::hours(-1),
            Duration::hours(MAX_TOKEN_TTL_HOURS) + Duration::seconds(1),
        ] {
            assert!(TokenIssuer::new(keys()).with_ttl(ttl).is_err(), "ttl {:?}", ttl);
        }

        let longest = TokenIssuer::new(keys())
            .with_ttl(Duration::hours(MAX_TOKEN_TTL_HOURS))
            .unwrap();
        assert_eq!(longest.ttl(), Duration::hours(MAX_TOKEN_TTL_HOURS));
    }

    #[tokio::test]
    async fn test_issue_records_session() {
        let registry = Arc::new(RecordingRegistry::default());
        let issuer = TokenIssuer::new(keys()).with_session_registry(registry.clone());

        let issued = issuer.issue(&UserId::new("u1")).await.unwrap();

        let sessions = registry.sessions.lock().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(Some(&sessions[0].token_id), issued.claims.jti.as_ref());
        assert_eq!(sessions[0].user_id, UserId::new("u1"));
        assert_eq!(sessions[0].expires_at, issued.claims.exp);
    }

    #[tokio::test]
    async fn test_session_failure_withholds_token() {
        let issuer = TokenIssuer::new(keys()).with_session_registry(Arc::new(FailingRegistry));

        let err = issuer.issue(&UserId::new("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
    }

    #[tokio::test]
    async fn test_each_token_gets_unique_id() {
        let issuer = TokenIssuer::new(keys());
        let a = issuer.issue(&UserId::new("u1")).await.unwrap();
        let b = issuer.issue(&UserId::new("u1")).await.unwrap();

        assert_ne!(a.claims.jti, b.claims.jti);
        assert_ne!(a.token, b.token);
    }
}
