//! Repository for the contact lifecycle.
//!
//! Contacts move `pending -> accepted | rejected`, both terminal. Only the
//! item's seller may transition one, and acceptance creates the conversation
//! inside the same transaction as the status update.

use crate::entities::{
    ContactDetail, ContactItem, ContactSeller, ContactStatus, ConversationRef, UserSummary,
};
use crate::repos::item_repository::row_to_item;
use crate::types::{ContactError, ContactResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const DETAIL_SELECT: &str = "
    SELECT c.public_id AS contact_public_id, c.status AS contact_status,
           c.created_at AS contact_created_at,
           bu.public_id AS buyer_public_id, bu.name AS buyer_name,
           bu.avatar_url AS buyer_avatar_url,
           i.id, i.public_id, i.seller_id, i.title, i.description, i.price, i.city,
           i.category, i.images, i.status, i.created_at, i.updated_at,
           su.public_id AS seller_public_id, su.name AS seller_name,
           su.avatar_url AS seller_avatar_url,
           cv.public_id AS conversation_public_id
    FROM contacts c
    JOIN users bu ON bu.id = c.user_id
    JOIN items i ON i.id = c.item_id
    JOIN users su ON su.id = i.seller_id
    LEFT JOIN conversations cv ON cv.contact_id = c.id";

/// Repository for contact database operations
pub struct ContactRepository {
    pool: SqlitePool,
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Contacts the user opened by right-swiping, newest first.
    pub async fn list_sent(&self, user_id: i64) -> ContactResult<Vec<ContactDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE c.user_id = ? ORDER BY c.created_at DESC");
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        rows.iter().map(row_to_detail).collect()
    }

    /// Contacts other users opened on this seller's items, newest first.
    pub async fn list_received(&self, seller_id: i64) -> ContactResult<Vec<ContactDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE i.seller_id = ? ORDER BY c.created_at DESC");
        let rows = sqlx::query(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        rows.iter().map(row_to_detail).collect()
    }

    /// Fetch a contact the viewer participates in, as buyer or seller.
    /// Foreign and missing contacts are indistinguishable.
    pub async fn find_visible(
        &self,
        public_id: &str,
        viewer_id: i64,
    ) -> ContactResult<Option<ContactDetail>> {
        let sql = format!(
            "{DETAIL_SELECT} WHERE c.public_id = ? AND (c.user_id = ? OR i.seller_id = ?)"
        );
        let row = sqlx::query(&sql)
            .bind(public_id)
            .bind(viewer_id)
            .bind(viewer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        row.as_ref().map(row_to_detail).transpose()
    }

    /// Resolve a contact through its conversation, same visibility rule as
    /// [`find_visible`](Self::find_visible).
    pub async fn find_by_conversation(
        &self,
        conversation_public_id: &str,
        viewer_id: i64,
    ) -> ContactResult<Option<ContactDetail>> {
        let sql = format!(
            "{DETAIL_SELECT} WHERE cv.public_id = ? AND (c.user_id = ? OR i.seller_id = ?)"
        );
        let row = sqlx::query(&sql)
            .bind(conversation_public_id)
            .bind(viewer_id)
            .bind(viewer_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        row.as_ref().map(row_to_detail).transpose()
    }

    /// Transition a pending contact. Only the item's seller may call this;
    /// for anyone else the contact does not exist. Accepting creates the
    /// conversation atomically with the status update. A contact that has
    /// already been resolved refuses further transitions.
    pub async fn transition(
        &self,
        public_id: &str,
        seller_id: i64,
        target: ContactStatus,
    ) -> ContactResult<ContactDetail> {
        if target == ContactStatus::Pending {
            return Err(ContactError::InvalidTransition);
        }

        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        // The pending guard lives in the UPDATE itself and runs under the
        // write lock, so of two concurrent transitions exactly one fires.
        let updated = sqlx::query(
            "UPDATE contacts SET status = ?, updated_at = ?
             WHERE status = 'pending'
               AND id IN (SELECT c.id FROM contacts c
                          JOIN items i ON i.id = c.item_id
                          WHERE c.public_id = ? AND i.seller_id = ?)",
        )
        .bind(target.as_str())
        .bind(&now)
        .bind(public_id)
        .bind(seller_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        if updated.rows_affected() == 0 {
            let known: Option<i64> = sqlx::query_scalar(
                "SELECT c.id FROM contacts c
                 JOIN items i ON i.id = c.item_id
                 WHERE c.public_id = ? AND i.seller_id = ?",
            )
            .bind(public_id)
            .bind(seller_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

            return match known {
                Some(_) => Err(ContactError::AlreadyResolved),
                None => Err(ContactError::ContactNotFound),
            };
        }

        if target == ContactStatus::Accepted {
            let contact_id: i64 = sqlx::query_scalar("SELECT id FROM contacts WHERE public_id = ?")
                .bind(public_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

            sqlx::query(
                "INSERT INTO conversations (public_id, contact_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(cuid2::cuid())
            .bind(contact_id)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

        info!(contact = public_id, status = %target, "contact transitioned");

        self.find_visible(public_id, seller_id)
            .await?
            .ok_or(ContactError::ContactNotFound)
    }
}

fn row_to_detail(row: &SqliteRow) -> ContactResult<ContactDetail> {
    let status: String = row
        .try_get("contact_status")
        .map_err(|e| ContactError::DatabaseError(e.to_string()))?;
    let status = ContactStatus::parse(&status).ok_or_else(|| {
        ContactError::DatabaseError(format!("unexpected contact status '{status}'"))
    })?;

    let item = row_to_item(row).map_err(|e| ContactError::DatabaseError(e.to_string()))?;

    let conversation: Option<String> = row
        .try_get("conversation_public_id")
        .map_err(|e| ContactError::DatabaseError(e.to_string()))?;

    Ok(ContactDetail {
        id: row
            .try_get("contact_public_id")
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
        status,
        created_at: row
            .try_get("contact_created_at")
            .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
        user: UserSummary {
            id: row
                .try_get("buyer_public_id")
                .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
            name: row
                .try_get("buyer_name")
                .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
            avatar_url: row
                .try_get("buyer_avatar_url")
                .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
        },
        item: ContactItem {
            item,
            seller: ContactSeller {
                id: row
                    .try_get("seller_public_id")
                    .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
                name: row
                    .try_get("seller_name")
                    .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
                avatar_url: row
                    .try_get("seller_avatar_url")
                    .map_err(|e| ContactError::DatabaseError(e.to_string()))?,
            },
        },
        conversation: conversation.map(|id| ConversationRef { id }),
    })
}
