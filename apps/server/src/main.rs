use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::Row;
use swibi_backend_api::{build_router, AppState};
use swibi_config::load as load_config;
use swibi_database::{CreateItemRequest, ItemRepository};
use swibi_runtime::{telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "swibi-server")]
#[command(about = "SwiBi marketplace backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Dump users, items, and contacts from the database
    DumpData,
    /// Clear all marketplace data from the database
    ClearData,
    /// Seed the database with demo accounts and items
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::DumpData => dump_data().await,
        Commands::ClearData => clear_data().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn bootstrap() -> anyhow::Result<(swibi_config::AppConfig, BackendServices)> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    Ok((config, services))
}

async fn run_server() -> anyhow::Result<()> {
    let (config, services) = bootstrap().await?;

    info!("starting SwiBi backend");

    let state = AppState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        config.feed.clone(),
    );
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(swibi_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn dump_data() -> anyhow::Result<()> {
    let (_, services) = bootstrap().await?;

    let users = sqlx::query(
        "SELECT id, public_id, email, name, city, created_at FROM users ORDER BY created_at ASC",
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<30} {:<20} {:<15} {:<25}",
            "ID", "Public ID", "Email", "Name", "City", "Created At"
        );
        println!("{}", "-".repeat(125));
        for user in users {
            let id: i64 = user.get("id");
            let public_id: String = user.get("public_id");
            let email: Option<String> = user.get("email");
            let name: Option<String> = user.get("name");
            let city: Option<String> = user.get("city");
            let created_at: String = user.get("created_at");

            println!(
                "{:<5} {:<26} {:<30} {:<20} {:<15} {:<25}",
                id,
                public_id,
                email.as_deref().unwrap_or("NULL"),
                name.as_deref().unwrap_or("NULL"),
                city.as_deref().unwrap_or("NULL"),
                created_at
            );
        }
    }

    println!("\n=== ITEMS ===");
    let items = sqlx::query(
        "SELECT id, public_id, seller_id, title, price, city, status, created_at
         FROM items ORDER BY created_at ASC",
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch items")?;

    if items.is_empty() {
        println!("No items found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<10} {:<30} {:<10} {:<15} {:<10} {:<25}",
            "ID", "Public ID", "Seller", "Title", "Price", "City", "Status", "Created At"
        );
        println!("{}", "-".repeat(135));
        for item in items {
            let id: i64 = item.get("id");
            let public_id: String = item.get("public_id");
            let seller_id: i64 = item.get("seller_id");
            let title: String = item.get("title");
            let price: f64 = item.get("price");
            let city: String = item.get("city");
            let status: String = item.get("status");
            let created_at: String = item.get("created_at");

            println!(
                "{:<5} {:<26} {:<10} {:<30} {:<10} {:<15} {:<10} {:<25}",
                id, public_id, seller_id, title, price, city, status, created_at
            );
        }
    }

    println!("\n=== CONTACTS ===");
    let contacts = sqlx::query(
        "SELECT c.id, c.public_id, c.user_id, c.item_id, c.status, c.created_at,
                cv.public_id AS conversation_public_id
         FROM contacts c
         LEFT JOIN conversations cv ON cv.contact_id = c.id
         ORDER BY c.created_at ASC",
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch contacts")?;

    if contacts.is_empty() {
        println!("No contacts found in database");
    } else {
        println!(
            "{:<5} {:<26} {:<10} {:<10} {:<10} {:<26} {:<25}",
            "ID", "Public ID", "Buyer", "Item", "Status", "Conversation", "Created At"
        );
        println!("{}", "-".repeat(115));
        for contact in contacts {
            let id: i64 = contact.get("id");
            let public_id: String = contact.get("public_id");
            let user_id: i64 = contact.get("user_id");
            let item_id: i64 = contact.get("item_id");
            let status: String = contact.get("status");
            let conversation: Option<String> = contact.get("conversation_public_id");
            let created_at: String = contact.get("created_at");

            println!(
                "{:<5} {:<26} {:<10} {:<10} {:<10} {:<26} {:<25}",
                id,
                public_id,
                user_id,
                item_id,
                status,
                conversation.as_deref().unwrap_or("NULL"),
                created_at
            );
        }
    }

    Ok(())
}

async fn clear_data() -> anyhow::Result<()> {
    let (_, services) = bootstrap().await?;

    info!("clearing all marketplace data from database");

    // Delete in dependency order to satisfy foreign keys.
    let mut deleted = Vec::new();
    for table in ["messages", "conversations", "contacts", "swipes", "items"] {
        let sql = format!("DELETE FROM {table}");
        let result = sqlx::query(&sql)
            .execute(&services.db_pool)
            .await
            .with_context(|| format!("failed to clear {table}"))?;
        deleted.push((table, result.rows_affected()));
    }

    println!("Database cleared:");
    for (table, rows) in deleted {
        println!("- {rows} {table} deleted");
    }

    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    let (_, services) = bootstrap().await?;

    info!("seeding database with demo data");

    let (seller, _) = services
        .authenticator
        .register_with_password("seller@swibi.dev", "secret123", Some("Demo Seller"))
        .await
        .context("failed to register demo seller")?;

    services
        .authenticator
        .register_with_password("buyer@swibi.dev", "secret123", Some("Demo Buyer"))
        .await
        .context("failed to register demo buyer")?;

    let items = ItemRepository::new(services.db_pool.clone());
    let demo_items = [
        ("Worn leather armchair", "Comfortable reading chair, some scuffs on the armrests.", 80.0, "Berlin", "furniture"),
        ("City bike, 28 inch", "Three gears, new tires, recently serviced.", 120.0, "Berlin", "sports"),
        ("Espresso machine", "Single boiler machine, descaled last month.", 95.0, "Hamburg", "kitchen"),
    ];

    for (title, description, price, city, category) in demo_items {
        items
            .create(
                seller.id,
                &CreateItemRequest {
                    title: title.to_string(),
                    description: description.to_string(),
                    price,
                    city: city.to_string(),
                    category: category.to_string(),
                    images: vec![format!(
                        "https://images.swibi.dev/{}.jpg",
                        title.to_lowercase().replace(' ', "-")
                    )],
                },
            )
            .await
            .with_context(|| format!("failed to seed item {title}"))?;
    }

    println!("Database seeded with demo data:");
    println!("- 2 accounts created (seller@swibi.dev / buyer@swibi.dev, password secret123)");
    println!("- {} items listed", demo_items.len());
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}
