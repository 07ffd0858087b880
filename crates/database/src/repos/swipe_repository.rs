//! Repository for swipe recording and the match list.

use crate::entities::{FeedItem, SellerSummary, Swipe, SwipeDirection};
use crate::repos::item_repository::row_to_item;
use crate::types::{ItemError, SwipeError, SwipeResult};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Repository for swipe database operations
pub struct SwipeRepository {
    pool: SqlitePool,
}

impl SwipeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a swipe fact for `(user_id, item)`. A right swipe also opens a
    /// pending contact in the same transaction; the unique index on
    /// `contacts(user_id, item_id)` makes the insert a no-op when the pair
    /// already has one, so concurrent right swipes cannot double-create.
    pub async fn record(
        &self,
        user_id: i64,
        item_public_id: &str,
        direction: SwipeDirection,
    ) -> SwipeResult<Swipe> {
        let item_id: Option<i64> = sqlx::query_scalar("SELECT id FROM items WHERE public_id = ?")
            .bind(item_public_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

        let Some(item_id) = item_id else {
            return Err(SwipeError::ItemNotFound);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO swipes (user_id, item_id, direction, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(item_id)
        .bind(direction.as_str())
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

        let swipe_id = result.last_insert_rowid();

        if direction == SwipeDirection::Right {
            let contact = sqlx::query(
                "INSERT INTO contacts (public_id, user_id, item_id, status, created_at, updated_at)
                 VALUES (?, ?, ?, 'pending', ?, ?)
                 ON CONFLICT(user_id, item_id) DO NOTHING",
            )
            .bind(cuid2::cuid())
            .bind(user_id)
            .bind(item_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

            if contact.rows_affected() > 0 {
                info!(user_id, item = item_public_id, "opened pending contact");
            }
        }

        tx.commit()
            .await
            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

        Ok(Swipe {
            id: swipe_id,
            user_id,
            item_id: item_public_id.to_string(),
            direction,
            created_at: now,
        })
    }

    /// Items the user swiped right on, with seller fields attached,
    /// most recent swipe first.
    pub async fn matches(&self, user_id: i64) -> SwipeResult<Vec<FeedItem>> {
        let rows = sqlx::query(
            "SELECT i.id, i.public_id, i.seller_id, i.title, i.description, i.price, i.city,
                    i.category, i.images, i.status, i.created_at, i.updated_at,
                    u.name AS seller_name, u.city AS seller_city
             FROM swipes s
             JOIN items i ON i.id = s.item_id
             JOIN users u ON u.id = i.seller_id
             WHERE s.user_id = ? AND s.direction = 'right'
             ORDER BY s.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SwipeError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(FeedItem {
                    item: row_to_item(row).map_err(item_error_to_swipe)?,
                    seller: SellerSummary {
                        name: row
                            .try_get("seller_name")
                            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?,
                        city: row
                            .try_get("seller_city")
                            .map_err(|e| SwipeError::DatabaseError(e.to_string()))?,
                    },
                })
            })
            .collect()
    }
}

fn item_error_to_swipe(err: ItemError) -> SwipeError {
    match err {
        ItemError::ItemNotFound => SwipeError::ItemNotFound,
        ItemError::DatabaseError(msg) => SwipeError::DatabaseError(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ContactStatus, CreateItemRequest};
    use crate::repos::test_support::{insert_user, test_pool};
    use crate::repos::ItemRepository;

    async fn listed_item(pool: &SqlitePool, seller: i64, title: &str) -> String {
        let repo = ItemRepository::new(pool.clone());
        let item = repo
            .create(
                seller,
                &CreateItemRequest {
                    title: title.to_string(),
                    description: "Something worth swiping right on".to_string(),
                    price: 10.0,
                    city: "Nantes".to_string(),
                    category: "misc".to_string(),
                    images: vec!["img".to_string()],
                },
            )
            .await
            .unwrap();
        item.public_id
    }

    #[tokio::test]
    async fn record_rejects_unknown_item() {
        let (pool, _dir) = test_pool().await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let repo = SwipeRepository::new(pool);

        let err = repo
            .record(buyer, "no-such-item", SwipeDirection::Left)
            .await
            .unwrap_err();
        assert!(matches!(err, SwipeError::ItemNotFound));
    }

    #[tokio::test]
    async fn left_swipe_opens_no_contact() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let item = listed_item(&pool, seller, "Chair").await;
        let repo = SwipeRepository::new(pool.clone());

        repo.record(buyer, &item, SwipeDirection::Left).await.unwrap();

        let contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(contacts, 0);
    }

    #[tokio::test]
    async fn right_swipe_opens_pending_contact_once() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let item = listed_item(&pool, seller, "Chair").await;
        let repo = SwipeRepository::new(pool.clone());

        repo.record(buyer, &item, SwipeDirection::Right).await.unwrap();
        // Swiping the same item again appends a swipe but not a second contact.
        repo.record(buyer, &item, SwipeDirection::Right).await.unwrap();

        let swipes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM swipes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(swipes, 2);

        let contacts: Vec<String> = sqlx::query_scalar("SELECT status FROM contacts")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(contacts, vec![ContactStatus::Pending.as_str().to_string()]);
    }

    #[tokio::test]
    async fn swiped_items_leave_the_feed() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let item = listed_item(&pool, seller, "Chair").await;

        let items = ItemRepository::new(pool.clone());
        assert_eq!(items.discover(buyer, 50, true).await.unwrap().len(), 1);

        let swipes = SwipeRepository::new(pool);
        swipes.record(buyer, &item, SwipeDirection::Left).await.unwrap();

        assert!(items.discover(buyer, 50, true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn matches_returns_right_swiped_items_with_seller() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let liked = listed_item(&pool, seller, "Liked").await;
        let passed = listed_item(&pool, seller, "Passed").await;
        let repo = SwipeRepository::new(pool);

        repo.record(buyer, &liked, SwipeDirection::Right).await.unwrap();
        repo.record(buyer, &passed, SwipeDirection::Left).await.unwrap();

        let matches = repo.matches(buyer).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item.public_id, liked);
        assert_eq!(matches[0].seller.name.as_deref(), Some("Sam"));
    }
}
