//! Session registry backed by SurrealDB.

use anyhow::Result;

use crate::auth::directory::{SessionRegistry, StoreFuture};
use crate::db::Db;
use crate::db::schema::SessionRecord;
use crate::types::{TokenId, UserId};

/// Append-only store of issued-token records.
#[derive(Clone)]
pub struct SessionStore {
    db: Db,
}

impl SessionStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Persist a session record. Token ids are unique.
    pub async fn insert(&self, session: &SessionRecord) -> Result<()> {
        let query = r#"
            CREATE session CONTENT {
                token_id: $token_id,
                user_id: $user_id,
                issued_at: $issued_at,
                expires_at: $expires_at
            } RETURN NONE
        "#;

        self.db
            .query(query)
            .bind(("token_id", session.token_id.as_str().to_string()))
            .bind(("user_id", session.user_id.as_str().to_string()))
            .bind(("issued_at", session.issued_at))
            .bind(("expires_at", session.expires_at))
            .await?
            .check()?;

        Ok(())
    }

    /// Look up the session mirroring a token.
    pub async fn find_session(&self, token_id: &TokenId) -> Result<Option<SessionRecord>> {
        let query = r#"
            SELECT token_id, user_id, issued_at, expires_at FROM session
            WHERE token_id = $token_id
            LIMIT 1
        "#;

        let mut res = self.db
            .query(query)
            .bind(("token_id", token_id.as_str().to_string()))
            .await?;

        let sessions: Vec<SessionRecord> = res.take(0)?;
        Ok(sessions.into_iter().next())
    }

    /// All sessions ever issued to a user, newest first.
    pub async fn list_sessions_for_user(&self, user_id: &UserId) -> Result<Vec<SessionRecord>> {
        let query = r#"
            SELECT token_id, user_id, issued_at, expires_at FROM session
            WHERE user_id = $user_id
            ORDER BY issued_at DESC
        "#;

        let mut res = self.db
            .query(query)
            .bind(("user_id", user_id.as_str().to_string()))
            .await?;

        let sessions: Vec<SessionRecord> = res.take(0)?;
        Ok(sessions)
    }
}

impl SessionRegistry for SessionStore {
    fn create_session<'a>(&'a self, session: &'a SessionRecord) -> StoreFuture<'a, ()> {
        Box::pin(self.insert(session))
    }
}
