//! Seeds the catalog with the two launch products.
//!
//! ## Usage
//! ```text
//! BAKESHOP_DB=./bakeshop.db cargo run -p bakeshop-db --bin seed
//! ```
//!
//! Idempotent: products are keyed by fixed UUIDs and re-running leaves
//! existing rows untouched.

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bakeshop_core::types::ProductKind;
use bakeshop_db::{Database, DbConfig, DbResult};

/// Fixed IDs so re-seeding never duplicates the catalog.
const STANDARD_BROWNIE_ID: &str = "8c9e3a54-1f2b-4d6e-9a7c-0b1d2e3f4a5b";
const CLEARANCE_BROWNIE_ID: &str = "d4f5a6b7-c8d9-4e0f-8a1b-2c3d4e5f6a7b";

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let path = std::env::var("BAKESHOP_DB").unwrap_or_else(|_| "./bakeshop.db".to_string());

    info!(path = %path, "Seeding catalog");

    let db = Database::new(DbConfig::new(&path)).await?;

    seed_product(
        &db,
        STANDARD_BROWNIE_ID,
        "Personalized brownie",
        Some("Baked to order: choose size, shape, filling and toppings"),
        ProductKind::Standard,
        590,
    )
    .await?;

    seed_product(
        &db,
        CLEARANCE_BROWNIE_ID,
        "Second-chance brownie",
        Some("Yesterday's surplus batch, 25% off, while stocks last"),
        ProductKind::ClearanceRestock,
        590,
    )
    .await?;

    db.close().await;

    info!("Seeding complete");

    Ok(())
}

/// Inserts a catalog row unless its fixed ID already exists.
async fn seed_product(
    db: &Database,
    id: &str,
    name: &str,
    description: Option<&str>,
    kind: ProductKind,
    base_price_cents: i64,
) -> DbResult<()> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO products (id, name, description, kind, base_price_cents,
                              is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(kind)
    .bind(base_price_cents)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await?;

    if result.rows_affected() > 0 {
        info!(product_id = %id, name = %name, "Product seeded");
    } else {
        info!(product_id = %id, name = %name, "Product already present, skipped");
    }

    Ok(())
}
