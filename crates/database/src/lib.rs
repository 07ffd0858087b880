//! SwiBi Database Crate
//!
//! Connection management, migrations, and repository implementations for the
//! marketplace schema (users, items, swipes, contacts, conversations,
//! messages).

use sqlx::SqlitePool;
use swibi_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{ContactRepository, ItemRepository, MessageRepository, SwipeRepository};

// Re-export entities
pub use entities::{
    contact::{ContactDetail, ContactItem, ContactSeller, ContactStatus, ConversationRef, UserSummary},
    item::{CreateItemRequest, FeedItem, Item, ItemStatus, SellerSummary, UpdateItemRequest},
    message::Message,
    swipe::{Swipe, SwipeDirection},
};

// Re-export types
pub use types::{
    errors::{ContactError, DatabaseError, ItemError, MessageError, SwipeError},
    ContactResult, DatabaseResult, ItemResult, MessageResult, SwipeResult,
};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn initialize_database_applies_migrations() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("init.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
