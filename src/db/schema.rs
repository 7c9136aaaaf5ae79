use serde::{Deserialize, Serialize};

use crate::messages::Content;
use crate::types::{MessageId, TokenId, UserId, Username};

/// Persisted account record.
///
/// Queries select these columns explicitly so the SurrealDB record `id`
/// never has to be deserialized; `user_id` is the stable identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Principal asserted by tokens issued to this user
    pub user_id: UserId,
    /// Unique, case-sensitive login name
    pub username: Username,
    /// Salted bcrypt hash of the password
    pub password_hash: String,
}

/// Server-side mirror of an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The `jti` claim of the token
    pub token_id: TokenId,
    /// The `principal` claim of the token
    pub user_id: UserId,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds; the session is stale afterwards
    pub expires_at: i64,
}

/// A message as stored in the recipient's mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub message_id: MessageId,
    pub sender: UserId,
    pub recipient: UserId,
    pub content: Content,
    /// RFC 3339
    pub sent_at: String,
}
