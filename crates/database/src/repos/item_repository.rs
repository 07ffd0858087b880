//! Repository for item catalog data access.

use crate::entities::{CreateItemRequest, FeedItem, Item, ItemStatus, SellerSummary, UpdateItemRequest};
use crate::types::{ItemError, ItemResult};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

const ITEM_COLUMNS: &str =
    "id, public_id, seller_id, title, description, price, city, category, images, status, created_at, updated_at";

/// Repository for item database operations
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new listing owned by `seller_id`. Status starts out active.
    pub async fn create(&self, seller_id: i64, request: &CreateItemRequest) -> ItemResult<Item> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();
        let images = serde_json::to_string(&request.images)
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO items (public_id, seller_id, title, description, price, city, category, images, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(seller_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.city)
        .bind(&request.category)
        .bind(&images)
        .bind(ItemStatus::Active.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        info!(public_id = %public_id, seller_id, "created item listing");

        self.find_by_public_id(&public_id)
            .await?
            .ok_or(ItemError::ItemNotFound)
    }

    /// Find an item by public id regardless of owner or status.
    pub async fn find_by_public_id(&self, public_id: &str) -> ItemResult<Option<Item>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE public_id = ?");
        let row = sqlx::query(&sql)
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        row.map(|row| row_to_item(&row)).transpose()
    }

    /// List a seller's own items, soft-deleted ones excluded, newest first.
    pub async fn list_for_seller(&self, seller_id: i64) -> ItemResult<Vec<Item>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE seller_id = ? AND status != 'deleted'
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        rows.iter().map(row_to_item).collect()
    }

    /// Partially update an item. Only the owner may update; anyone else sees
    /// the item as absent.
    pub async fn update(
        &self,
        public_id: &str,
        seller_id: i64,
        request: &UpdateItemRequest,
    ) -> ItemResult<Item> {
        self.find_owned(public_id, seller_id).await?;

        let images = request
            .images
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "UPDATE items SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                price = COALESCE(?, price),
                city = COALESCE(?, city),
                category = COALESCE(?, category),
                images = COALESCE(?, images),
                status = COALESCE(?, status),
                updated_at = ?
             WHERE public_id = ? AND seller_id = ?",
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.price)
        .bind(&request.city)
        .bind(&request.category)
        .bind(&images)
        .bind(request.status.map(|s| s.as_str()))
        .bind(&now)
        .bind(public_id)
        .bind(seller_id)
        .execute(&self.pool)
        .await
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        self.find_by_public_id(public_id)
            .await?
            .ok_or(ItemError::ItemNotFound)
    }

    /// Soft delete: the row stays, status becomes deleted.
    pub async fn soft_delete(&self, public_id: &str, seller_id: i64) -> ItemResult<()> {
        self.find_owned(public_id, seller_id).await?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("UPDATE items SET status = 'deleted', updated_at = ? WHERE public_id = ?")
            .bind(&now)
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        info!(public_id, seller_id, "soft deleted item");
        Ok(())
    }

    /// Mark an item sold. Unconditional once ownership is established; the
    /// schema does not tie the sale to a particular contact.
    pub async fn mark_sold(&self, public_id: &str, seller_id: i64) -> ItemResult<Item> {
        self.find_owned(public_id, seller_id).await?;

        let now = chrono::Utc::now().to_rfc3339();
        sqlx::query("UPDATE items SET status = 'sold', updated_at = ? WHERE public_id = ?")
            .bind(&now)
            .bind(public_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        info!(public_id, seller_id, "marked item sold");

        self.find_by_public_id(public_id)
            .await?
            .ok_or(ItemError::ItemNotFound)
    }

    /// Discovery feed for `user_id`: other sellers' items the user has not
    /// swiped yet, newest first, soft-deleted items always excluded and sold
    /// items excluded unless `include_sold` is set.
    pub async fn discover(
        &self,
        user_id: i64,
        page_size: u32,
        include_sold: bool,
    ) -> ItemResult<Vec<FeedItem>> {
        let rows = sqlx::query(
            "SELECT i.id, i.public_id, i.seller_id, i.title, i.description, i.price, i.city,
                    i.category, i.images, i.status, i.created_at, i.updated_at,
                    u.name AS seller_name, u.city AS seller_city
             FROM items i
             JOIN users u ON u.id = i.seller_id
             WHERE i.seller_id != ?
               AND i.status != 'deleted'
               AND (? OR i.status != 'sold')
               AND NOT EXISTS (
                   SELECT 1 FROM swipes s WHERE s.user_id = ? AND s.item_id = i.id
               )
             ORDER BY i.created_at DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(include_sold)
        .bind(user_id)
        .bind(i64::from(page_size))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(FeedItem {
                    item: row_to_item(row)?,
                    seller: SellerSummary {
                        name: row
                            .try_get("seller_name")
                            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
                        city: row
                            .try_get("seller_city")
                            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
                    },
                })
            })
            .collect()
    }

    async fn find_owned(&self, public_id: &str, seller_id: i64) -> ItemResult<Item> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE public_id = ? AND seller_id = ?");
        let row = sqlx::query(&sql)
        .bind(public_id)
        .bind(seller_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

        match row {
            Some(row) => row_to_item(&row),
            None => Err(ItemError::ItemNotFound),
        }
    }
}

pub(crate) fn row_to_item(row: &SqliteRow) -> ItemResult<Item> {
    let images_json: String = row
        .try_get("images")
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;
    let images: Vec<String> = serde_json::from_str(&images_json)
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;
    let status: String = row
        .try_get("status")
        .map_err(|e| ItemError::DatabaseError(e.to_string()))?;

    Ok(Item {
        id: row
            .try_get("id")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        public_id: row
            .try_get("public_id")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        seller_id: row
            .try_get("seller_id")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        title: row
            .try_get("title")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        description: row
            .try_get("description")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        price: row
            .try_get("price")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        city: row
            .try_get("city")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        category: row
            .try_get("category")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        images,
        status: ItemStatus::from(status.as_str()),
        created_at: row
            .try_get("created_at")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| ItemError::DatabaseError(e.to_string()))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::{insert_user, test_pool};

    fn sample_request(title: &str) -> CreateItemRequest {
        CreateItemRequest {
            title: title.to_string(),
            description: "A well loved thing looking for a new home".to_string(),
            price: 25.0,
            city: "Lyon".to_string(),
            category: "furniture".to_string(),
            images: vec!["data:image/png;base64,xyz".to_string()],
        }
    }

    #[tokio::test]
    async fn create_and_fetch_item() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let repo = ItemRepository::new(pool);

        let item = repo.create(seller, &sample_request("Old bike")).await.unwrap();
        assert_eq!(item.title, "Old bike");
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.images.len(), 1);

        let found = repo.find_by_public_id(&item.public_id).await.unwrap().unwrap();
        assert_eq!(found, item);
    }

    #[tokio::test]
    async fn list_for_seller_skips_deleted() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let repo = ItemRepository::new(pool);

        let keep = repo.create(seller, &sample_request("Keep")).await.unwrap();
        let gone = repo.create(seller, &sample_request("Gone")).await.unwrap();
        repo.soft_delete(&gone.public_id, seller).await.unwrap();

        let items = repo.list_for_seller(seller).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].public_id, keep.public_id);
    }

    #[tokio::test]
    async fn update_rejects_non_owner() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let other = insert_user(&pool, "other@example.com", "Olga").await;
        let repo = ItemRepository::new(pool);

        let item = repo.create(seller, &sample_request("Lamp")).await.unwrap();

        let update = UpdateItemRequest {
            title: Some("Better lamp".to_string()),
            ..UpdateItemRequest::default()
        };
        let err = repo.update(&item.public_id, other, &update).await.unwrap_err();
        assert!(matches!(err, ItemError::ItemNotFound));

        let updated = repo.update(&item.public_id, seller, &update).await.unwrap();
        assert_eq!(updated.title, "Better lamp");
        assert_eq!(updated.description, item.description);
    }

    #[tokio::test]
    async fn mark_sold_transitions_status() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let repo = ItemRepository::new(pool);

        let item = repo.create(seller, &sample_request("Sofa")).await.unwrap();
        let sold = repo.mark_sold(&item.public_id, seller).await.unwrap();
        assert_eq!(sold.status, ItemStatus::Sold);
    }

    #[tokio::test]
    async fn discover_excludes_own_and_deleted_items() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let repo = ItemRepository::new(pool);

        let visible = repo.create(seller, &sample_request("Visible")).await.unwrap();
        let deleted = repo.create(seller, &sample_request("Deleted")).await.unwrap();
        repo.soft_delete(&deleted.public_id, seller).await.unwrap();
        repo.create(buyer, &sample_request("Own")).await.unwrap();

        let feed = repo.discover(buyer, 50, true).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].item.public_id, visible.public_id);
        assert_eq!(feed[0].seller.name.as_deref(), Some("Sam"));
    }

    #[tokio::test]
    async fn discover_respects_include_sold_flag() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let repo = ItemRepository::new(pool);

        let sold = repo.create(seller, &sample_request("Sold one")).await.unwrap();
        repo.mark_sold(&sold.public_id, seller).await.unwrap();

        let with_sold = repo.discover(buyer, 50, true).await.unwrap();
        assert_eq!(with_sold.len(), 1);

        let without_sold = repo.discover(buyer, 50, false).await.unwrap();
        assert!(without_sold.is_empty());
    }

    #[tokio::test]
    async fn discover_orders_newest_first_and_caps_page_size() {
        let (pool, _dir) = test_pool().await;
        let seller = insert_user(&pool, "seller@example.com", "Sam").await;
        let buyer = insert_user(&pool, "buyer@example.com", "Bea").await;
        let repo = ItemRepository::new(pool.clone());

        for n in 0..3 {
            let item = repo.create(seller, &sample_request(&format!("Item {n}"))).await.unwrap();
            // Spread creation times so the ordering is deterministic.
            sqlx::query("UPDATE items SET created_at = ? WHERE id = ?")
                .bind(format!("2026-01-0{}T00:00:00+00:00", n + 1))
                .bind(item.id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let feed = repo.discover(buyer, 2, true).await.unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].item.title, "Item 2");
        assert_eq!(feed[1].item.title, "Item 1");
    }
}
