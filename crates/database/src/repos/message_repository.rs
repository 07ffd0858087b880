//! Repository for conversation messages.
//!
//! Every operation goes through the participant guard first: a conversation
//! is only reachable by the contact's buyer or the item's seller, and a
//! conversation the viewer cannot reach reads as absent.

use crate::entities::{Message, UserSummary};
use crate::types::{MessageError, MessageResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Full message history of a conversation, ascending by creation time.
    pub async fn list(
        &self,
        conversation_public_id: &str,
        viewer_id: i64,
    ) -> MessageResult<Vec<Message>> {
        let conversation_id = self
            .resolve_for_participant(conversation_public_id, viewer_id)
            .await?;

        let rows = sqlx::query(
            "SELECT m.id, m.public_id, m.content, m.created_at,
                    u.public_id AS sender_public_id, u.name AS sender_name,
                    u.avatar_url AS sender_avatar_url
             FROM messages m
             JOIN users u ON u.id = m.sender_id
             WHERE m.conversation_id = ?
             ORDER BY m.created_at ASC, m.id ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| row_to_message(row, conversation_public_id))
            .collect()
    }

    /// Append a message. Content is stored trimmed; whitespace-only content
    /// is rejected before anything is written.
    pub async fn append(
        &self,
        conversation_public_id: &str,
        sender_id: i64,
        content: &str,
    ) -> MessageResult<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MessageError::EmptyContent);
        }

        let conversation_id = self
            .resolve_for_participant(conversation_public_id, sender_id)
            .await?;

        let public_id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (public_id, conversation_id, sender_id, content, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        info!(
            conversation = conversation_public_id,
            sender_id, "appended message"
        );

        let sender = sqlx::query(
            "SELECT public_id AS sender_public_id, name AS sender_name,
                    avatar_url AS sender_avatar_url
             FROM users WHERE id = ?",
        )
        .bind(sender_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        Ok(Message {
            internal_id: result.last_insert_rowid(),
            public_id,
            conversation_id: conversation_public_id.to_string(),
            content: content.to_string(),
            created_at: now,
            sender: sender_summary(&sender)?,
        })
    }

    /// The access guard: resolve a conversation constrained to the viewer
    /// being a participant. Absent and foreign conversations look identical.
    async fn resolve_for_participant(
        &self,
        conversation_public_id: &str,
        viewer_id: i64,
    ) -> MessageResult<i64> {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT cv.id
             FROM conversations cv
             JOIN contacts c ON c.id = cv.contact_id
             JOIN items i ON i.id = c.item_id
             WHERE cv.public_id = ? AND (c.user_id = ? OR i.seller_id = ?)",
        )
        .bind(conversation_public_id)
        .bind(viewer_id)
        .bind(viewer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MessageError::DatabaseError(e.to_string()))?;

        id.ok_or(MessageError::ConversationNotFound)
    }
}

fn row_to_message(row: &SqliteRow, conversation_public_id: &str) -> MessageResult<Message> {
    Ok(Message {
        internal_id: row
            .try_get("id")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        conversation_id: conversation_public_id.to_string(),
        content: row
            .try_get("content")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        sender: sender_summary(row)?,
    })
}

fn sender_summary(row: &SqliteRow) -> MessageResult<UserSummary> {
    Ok(UserSummary {
        id: row
            .try_get("sender_public_id")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        name: row
            .try_get("sender_name")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        avatar_url: row
            .try_get("sender_avatar_url")
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ContactStatus, CreateItemRequest, SwipeDirection};
    use crate::repos::test_support::{insert_user, test_pool};
    use crate::repos::{ContactRepository, ItemRepository, SwipeRepository};

    struct Fixture {
        pool: SqlitePool,
        seller: i64,
        buyer: i64,
        conversation_id: String,
    }

    async fn accepted_conversation(pool: &SqlitePool) -> Fixture {
        let seller = insert_user(pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(pool, "buyer@example.com", "Bea").await;

        let item = ItemRepository::new(pool.clone())
            .create(
                seller,
                &CreateItemRequest {
                    title: "Desk".to_string(),
                    description: "Solid oak desk with one wobbly leg".to_string(),
                    price: 60.0,
                    city: "Rennes".to_string(),
                    category: "furniture".to_string(),
                    images: vec!["img".to_string()],
                },
            )
            .await
            .unwrap();

        SwipeRepository::new(pool.clone())
            .record(buyer, &item.public_id, SwipeDirection::Right)
            .await
            .unwrap();

        let contact_id: String = sqlx::query_scalar("SELECT public_id FROM contacts")
            .fetch_one(pool)
            .await
            .unwrap();

        let accepted = ContactRepository::new(pool.clone())
            .transition(&contact_id, seller, ContactStatus::Accepted)
            .await
            .unwrap();

        Fixture {
            pool: pool.clone(),
            seller,
            buyer,
            conversation_id: accepted.conversation.unwrap().id,
        }
    }

    #[tokio::test]
    async fn both_parties_read_the_same_history_in_order() {
        let (pool, _dir) = test_pool().await;
        let fx = accepted_conversation(&pool).await;
        let repo = MessageRepository::new(fx.pool.clone());

        repo.append(&fx.conversation_id, fx.buyer, "Is this available?")
            .await
            .unwrap();
        repo.append(&fx.conversation_id, fx.seller, "Yes, still here")
            .await
            .unwrap();
        repo.append(&fx.conversation_id, fx.buyer, "Great, I'll take it")
            .await
            .unwrap();

        for viewer in [fx.buyer, fx.seller] {
            let history = repo.list(&fx.conversation_id, viewer).await.unwrap();
            assert_eq!(history.len(), 3);
            assert_eq!(history[0].content, "Is this available?");
            assert_eq!(history[0].sender.name.as_deref(), Some("Bea"));
            assert_eq!(history[1].sender.name.as_deref(), Some("Sam"));
            assert!(history
                .windows(2)
                .all(|pair| pair[0].created_at <= pair[1].created_at));
        }
    }

    #[tokio::test]
    async fn whitespace_content_is_rejected_and_stored_trimmed() {
        let (pool, _dir) = test_pool().await;
        let fx = accepted_conversation(&pool).await;
        let repo = MessageRepository::new(fx.pool.clone());

        let err = repo
            .append(&fx.conversation_id, fx.buyer, "   \t\n")
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::EmptyContent));

        let message = repo
            .append(&fx.conversation_id, fx.buyer, "  hello there  ")
            .await
            .unwrap();
        assert_eq!(message.content, "hello there");
    }

    #[tokio::test]
    async fn third_party_cannot_reach_the_conversation() {
        let (pool, _dir) = test_pool().await;
        let fx = accepted_conversation(&pool).await;
        let stranger = insert_user(&pool, "stranger@example.com", "Tom").await;
        let repo = MessageRepository::new(fx.pool.clone());

        let err = repo.list(&fx.conversation_id, stranger).await.unwrap_err();
        assert!(matches!(err, MessageError::ConversationNotFound));

        let err = repo
            .append(&fx.conversation_id, stranger, "let me in")
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::ConversationNotFound));
    }

    #[tokio::test]
    async fn unknown_conversation_reads_as_absent() {
        let (pool, _dir) = test_pool().await;
        let fx = accepted_conversation(&pool).await;
        let repo = MessageRepository::new(fx.pool);

        let err = repo.list("missing-conversation", fx.buyer).await.unwrap_err();
        assert!(matches!(err, MessageError::ConversationNotFound));
    }
}
