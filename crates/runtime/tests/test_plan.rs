use std::path::Path;

use anyhow::{Context, Result};
use swibi_config::AppConfig;
use swibi_runtime::BackendServices;
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'items'",
    )
    .fetch_one(&services.db_pool)
    .await?;

    assert_eq!("items", table);

    drop(services);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_creates_sqlite_directory_if_missing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_dir = temp_dir.path().join("nested");
    let db_path = db_dir.join("prepared.db");
    let config = build_config(sqlite_url(&db_path), 2);

    assert!(!db_dir.exists());

    let services = initialise(&config).await?;
    assert!(db_dir.exists(), "database directory should be created");
    drop(services);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticator_is_wired_to_the_same_pool() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/auth.db");
    let config = build_config(sqlite_url(&db_path), 2);

    let services = initialise(&config).await?;
    let (user, session) = services
        .authenticator
        .register_with_password("runtime@example.com", "secret123", Some("Runtime"))
        .await?;

    let stored: i64 = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
        .bind(&session.token)
        .fetch_one(&services.db_pool)
        .await?;
    assert_eq!(stored, user.id);

    drop(services);
    Ok(())
}
