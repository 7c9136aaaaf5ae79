//! Mailbox persistence.

use anyhow::Result;

use crate::db::Db;
use crate::db::schema::MessageRecord;
use crate::types::UserId;

/// Message store for database operations.
#[derive(Clone)]
pub struct MessageStore {
    db: Db,
}

impl MessageStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn save_message(&self, message: &MessageRecord) -> Result<()> {
        let query = r#"
            CREATE message CONTENT {
                message_id: $message_id,
                sender: $sender,
                recipient: $recipient,
                content: $content,
                sent_at: $sent_at
            } RETURN NONE
        "#;

        self.db
            .query(query)
            .bind(("message_id", message.message_id.as_str().to_string()))
            .bind(("sender", message.sender.as_str().to_string()))
            .bind(("recipient", message.recipient.as_str().to_string()))
            .bind(("content", message.content.clone()))
            .bind(("sent_at", message.sent_at.clone()))
            .await?
            .check()?;

        Ok(())
    }

    /// A page of `recipient`'s mailbox in send order, skipping `start`.
    pub async fn list_messages(
        &self,
        recipient: &UserId,
        start: u64,
        limit: u64,
    ) -> Result<Vec<MessageRecord>> {
        let query = r#"
            SELECT message_id, sender, recipient, content, sent_at FROM message
            WHERE recipient = $recipient
            ORDER BY message_id ASC
            LIMIT $limit START $start
        "#;

        let mut res = self.db
            .query(query)
            .bind(("recipient", recipient.as_str().to_string()))
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;

        let messages: Vec<MessageRecord> = res.take(0)?;
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection, ensure_schema, DatabaseConfig};
    use crate::messages::{Content, MessageType};
    use crate::types::MessageId;

    async fn setup_test_db() -> Db {
        let config = DatabaseConfig {
            url: "memory".to_string(),
            ..Default::default()
        };
        let db = create_connection(config).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    fn message(id: &str, sender: &str, recipient: &str, text: &str) -> MessageRecord {
        MessageRecord {
            message_id: MessageId::new(id),
            sender: UserId::new(sender),
            recipient: UserId::new(recipient),
            content: Content {
                kind: MessageType::Text,
                text: text.to_string(),
            },
            sent_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let store = MessageStore::new(setup_test_db().await);
        let saved = message("m1", "alice", "bob", "hi bob");

        store.save_message(&saved).await.unwrap();

        let inbox = store.list_messages(&UserId::new("bob"), 0, 100).await.unwrap();
        assert_eq!(inbox, vec![saved]);
        assert!(store.list_messages(&UserId::new("alice"), 0, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_pages_in_id_order() {
        let store = MessageStore::new(setup_test_db().await);

        for (id, text) in [("m3", "third"), ("m1", "first"), ("m2", "second")] {
            store.save_message(&message(id, "alice", "bob", text)).await.unwrap();
        }

        let page = store.list_messages(&UserId::new("bob"), 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].content.text, "second");

        let all = store.list_messages(&UserId::new("bob"), 0, 10).await.unwrap();
        let texts: Vec<&str> = all.iter().map(|m| m.content.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }
}
