//! Private messaging between registered users.
//!
//! Every operation takes the caller's [`AuthContext`] and runs the
//! ownership guard before touching storage.

mod store;

pub use store::MessageStore;

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::auth::{Access, AuthContext, AuthError, UserStore, authorize};
use crate::db::schema::MessageRecord;
use crate::types::{MessageId, UserId};

/// Page size when the caller does not ask for one.
pub const DEFAULT_MESSAGES_LIMIT: u64 = 100;

/// Largest page a single read returns.
pub const MAX_MESSAGES_LIMIT: u64 = 1000;

/// Kind of payload a message carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
}

impl FromStr for MessageType {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            other => Err(MessageError::InvalidType(other.to_string())),
        }
    }
}

/// Body of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub text: String,
}

impl Content {
    /// Build content from an unchecked type name.
    pub fn parse(kind: &str, text: impl Into<String>) -> Result<Self, MessageError> {
        Ok(Self {
            kind: kind.parse()?,
            text: text.into(),
        })
    }
}

/// Errors from messaging operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Guard refused the operation
    Auth(AuthError),
    /// Content type outside text/image/video
    InvalidType(String),
    /// Recipient does not exist
    UnknownUser(UserId),
    /// Storage failure
    Storage(String),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(e) => write!(f, "{}", e),
            Self::InvalidType(kind) => write!(f, "Invalid message type: {}", kind),
            Self::UnknownUser(id) => write!(f, "User not found: {}", id),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for MessageError {}

impl From<AuthError> for MessageError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

/// Send and read operations over the mailbox store.
#[derive(Clone)]
pub struct MessageService {
    messages: MessageStore,
    users: UserStore,
}

impl MessageService {
    pub fn new(messages: MessageStore, users: UserStore) -> Self {
        Self { messages, users }
    }

    /// Deliver `content` from `sender` to `recipient`.
    ///
    /// The declared sender must be the authenticated principal.
    pub async fn send(
        &self,
        ctx: &AuthContext,
        sender: &UserId,
        recipient: &UserId,
        content: Content,
    ) -> Result<MessageRecord, MessageError> {
        authorize(ctx, sender, Access::Send)?;

        let exists = self
            .users
            .get_user_by_id(recipient)
            .await
            .map_err(|e| MessageError::Storage(e.to_string()))?;
        if exists.is_none() {
            return Err(MessageError::UnknownUser(recipient.clone()));
        }

        let message = MessageRecord {
            message_id: MessageId::generate(),
            sender: sender.clone(),
            recipient: recipient.clone(),
            content,
            sent_at: Utc::now().to_rfc3339(),
        };

        self.messages.save_message(&message).await.map_err(|e| {
            error!("Failed to store message from {}: {}", sender, e);
            MessageError::Storage(e.to_string())
        })?;

        debug!("Stored message {} for {}", message.message_id, recipient);
        Ok(message)
    }

    /// Read a page of `recipient`'s mailbox.
    ///
    /// Only the mailbox owner may read it. `limit` defaults to
    /// [`DEFAULT_MESSAGES_LIMIT`] and is capped at [`MAX_MESSAGES_LIMIT`].
    pub async fn list(
        &self,
        ctx: &AuthContext,
        recipient: &UserId,
        start: u64,
        limit: Option<u64>,
    ) -> Result<Vec<MessageRecord>, MessageError> {
        authorize(ctx, recipient, Access::Read)?;

        let limit = limit.unwrap_or(DEFAULT_MESSAGES_LIMIT).min(MAX_MESSAGES_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }

        self.messages
            .list_messages(recipient, start, limit)
            .await
            .map_err(|e| {
                error!("Failed to read mailbox of {}: {}", recipient, e);
                MessageError::Storage(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenValidator;
    use crate::auth::{SigningKeys, TokenIssuer};
    use crate::db::{create_connection, ensure_schema, DatabaseConfig, Db};
    use crate::types::Username;
    use std::sync::Arc;

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    struct Fixture {
        service: MessageService,
        alice: AuthContext,
        bob: AuthContext,
    }

    /// Two registered users, each with a context obtained the real way.
    async fn fixture() -> Fixture {
        let db = setup_test_db().await;
        let users = UserStore::new(db.clone());
        let keys = Arc::new(SigningKeys::from_secret(b"messages-test-secret").unwrap());
        let issuer = TokenIssuer::new(keys.clone());
        let validator = TokenValidator::new(keys, Arc::new(users.clone()));

        let mut contexts = Vec::new();
        for name in ["alice", "bob"] {
            let user = users.create_user(&Username::new(name), "unused").await.unwrap();
            let token = issuer.issue(&user.user_id).await.unwrap().token;
            let header = format!("Bearer {}", token);
            contexts.push(validator.authenticate(Some(&header)).await.unwrap());
        }
        let bob = contexts.pop().unwrap();
        let alice = contexts.pop().unwrap();

        Fixture {
            service: MessageService::new(MessageStore::new(db), users),
            alice,
            bob,
        }
    }

    fn text(body: &str) -> Content {
        Content::parse("text", body).unwrap()
    }

    #[test]
    fn test_message_type_parse() {
        assert_eq!("image".parse::<MessageType>().unwrap(), MessageType::Image);
        assert_eq!(
            "audio".parse::<MessageType>().unwrap_err(),
            MessageError::InvalidType("audio".to_string())
        );
        assert!(Content::parse("TEXT", "x").is_err());
    }

    #[test]
    fn test_content_wire_format() {
        let json = serde_json::to_value(text("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "text", "text": "hello"}));
    }

    #[tokio::test]
    async fn test_send_and_read_own_mailbox() {
        let f = fixture().await;
        let alice_id = f.alice.principal().clone();
        let bob_id = f.bob.principal().clone();

        let sent = f.service.send(&f.alice, &alice_id, &bob_id, text("hi")).await.unwrap();
        assert_eq!(sent.sender, alice_id);

        let inbox = f.service.list(&f.bob, &bob_id, 0, None).await.unwrap();
        assert_eq!(inbox, vec![sent]);
    }

    #[tokio::test]
    async fn test_send_as_someone_else_forbidden() {
        let f = fixture().await;
        let alice_id = f.alice.principal().clone();
        let bob_id = f.bob.principal().clone();

        let err = f
            .service
            .send(&f.alice, &bob_id, &alice_id, text("spoofed"))
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::Auth(AuthError::Forbidden(_))));

        // Nothing was stored.
        assert!(f.service.list(&f.alice, &alice_id, 0, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_other_mailbox_forbidden() {
        let f = fixture().await;
        let bob_id = f.bob.principal().clone();

        let err = f.service.list(&f.alice, &bob_id, 0, None).await.unwrap_err();
        assert!(matches!(err, MessageError::Auth(AuthError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_send_to_unknown_recipient() {
        let f = fixture().await;
        let alice_id = f.alice.principal().clone();

        let err = f
            .service
            .send(&f.alice, &alice_id, &UserId::new("nobody"), text("hello?"))
            .await
            .unwrap_err();
        assert_eq!(err, MessageError::UnknownUser(UserId::new("nobody")));
    }

    #[tokio::test]
    async fn test_pagination() {
        let f = fixture().await;
        let alice_id = f.alice.principal().clone();
        let bob_id = f.bob.principal().clone();

        for i in 0..5 {
            f.service
                .send(&f.alice, &alice_id, &bob_id, text(&format!("msg {}", i)))
                .await
                .unwrap();
        }

        let page = f.service.list(&f.bob, &bob_id, 2, Some(2)).await.unwrap();
        assert_eq!(page.len(), 2);

        assert!(f.service.list(&f.bob, &bob_id, 0, Some(0)).await.unwrap().is_empty());
        assert_eq!(f.service.list(&f.bob, &bob_id, 0, None).await.unwrap().len(), 5);
    }
}
