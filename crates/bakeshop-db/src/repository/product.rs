//! # Product Repository
//!
//! Catalog access: the products customers can put in their carts.
//!
//! ## Base Price Authority
//! The catalog row is the single source of truth for a product's base
//! price. Carts store product references only; the pricing engine is fed
//! the price read here, never anything a client submitted.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use bakeshop_core::types::{Product, ProductKind};
use bakeshop_core::validation::{validate_price_cents, validate_product_name, validate_uuid};

use crate::error::{DbError, DbResult};

// =============================================================================
// Input Types
// =============================================================================

/// Data required to create a new catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub kind: ProductKind,
    /// Base price per unit in cents, strictly positive.
    pub base_price_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new product repository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new catalog product.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] for an empty/overlong name or a
    ///   non-positive price
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        validate_product_name(&input.name)?;
        validate_price_cents(input.base_price_cents)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            kind: input.kind,
            base_price_cents: input.base_price_cents,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, kind, base_price_cents,
                                  is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.kind)
        .bind(product.base_price_cents)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(product_id = %product.id, name = %product.name, "Product created");

        Ok(product)
    }

    /// Gets a product by its UUID.
    ///
    /// A malformed ID is rejected up front instead of being sent to the
    /// database as a lookup that can never match.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        validate_uuid(id)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, kind, base_price_cents,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product)
    }

    /// Lists active products, alphabetically.
    ///
    /// This is the catalog page query: soft-deleted products disappear
    /// here but remain resolvable by ID for existing carts and orders.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, kind, base_price_cents,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed active products");

        Ok(products)
    }

    /// Updates a product's base price.
    ///
    /// Existing orders are unaffected (they snapshot prices); open carts
    /// pick up the new price on their next pricing request.
    pub async fn update_price(&self, id: &str, base_price_cents: i64) -> DbResult<Product> {
        validate_uuid(id)?;
        validate_price_cents(base_price_cents)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET base_price_cents = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(base_price_cents)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, base_price_cents, "Product price updated");

        self.get_by_id(id).await
    }

    /// Soft-deletes a product (sets is_active = false).
    ///
    /// The row is kept so order history and open cart lines still resolve.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        validate_uuid(id)?;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET is_active = 0, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        info!(product_id = %id, "Product deactivated");

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
