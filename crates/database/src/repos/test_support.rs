//! Shared fixtures for repository tests.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub(crate) async fn test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("repo_tests.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .unwrap();

    crate::migrations::MIGRATOR.run(&pool).await.unwrap();

    (pool, temp_dir)
}

pub(crate) async fn insert_user(pool: &SqlitePool, email: &str, name: &str) -> i64 {
    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        "INSERT INTO users (public_id, email, name, city, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(cuid2::cuid())
    .bind(email)
    .bind(name)
    .bind("Paris")
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .unwrap();

    result.last_insert_rowid()
}
