//! # Cart Repository
//!
//! Session cart persistence.
//!
//! ## What Gets Stored
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Storage Model                                   │
//! │                                                                         │
//! │  carts        1 row per session token                                   │
//! │  cart_items   the customer's CHOICES only:                              │
//! │               product_id, quantity, personalization                     │
//! │                                                                         │
//! │  NOT stored: prices, discounts, totals.                                 │
//! │                                                                         │
//! │  load_lines() joins the live catalog for name / kind / base price       │
//! │  and hands the result to the pricing engine. A price change or a       │
//! │  weekday boundary between two requests is therefore reflected          │
//! │  immediately, with nothing stale to invalidate.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Merge Rule
//! Adding the same product with the same personalization increases the
//! existing row's quantity. The merge match is null-safe (`IS` instead of
//! `=`) because absent personalization fields are stored as NULL.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use bakeshop_core::cart::CartLineItem;
use bakeshop_core::types::{Personalization, ProductKind};
use bakeshop_core::validation::{
    validate_cart_size, validate_personalization_field, validate_quantity, validate_uuid,
};
use bakeshop_core::MAX_ITEM_QUANTITY;

use crate::error::{DbError, DbResult};

// =============================================================================
// Row Types
// =============================================================================

/// A cart item row joined with its live catalog data.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: String,
    product_id: String,
    name: String,
    kind: ProductKind,
    base_price_cents: i64,
    quantity: i64,
    size: Option<String>,
    shape: Option<String>,
    filling: Option<String>,
    toppings: Option<String>,
}

impl CartLineRow {
    /// Converts the row into a validated pricing-engine input line.
    ///
    /// A row that fails the boundary checks here means the catalog was
    /// edited underneath us (e.g. a zeroed price); that is surfaced as
    /// a corrupt-row error, not silently priced.
    fn into_line_item(self) -> DbResult<CartLineItem> {
        let personalization = match (self.size, self.shape) {
            (Some(size), Some(shape)) => Some(Personalization {
                size,
                shape,
                filling: self.filling,
                toppings: self.toppings,
            }),
            _ => None,
        };

        CartLineItem::new(
            self.id,
            self.product_id,
            self.name,
            self.kind,
            self.base_price_cents,
            self.quantity,
            personalization,
        )
        .map_err(|e| DbError::corrupt("cart_item", e.to_string()))
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for session cart operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new cart repository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Ensures a cart row exists for the session token.
    ///
    /// Idempotent; called before the first add for a session.
    pub async fn ensure_cart(&self, session_token: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO carts (session_token, created_at, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (session_token) DO NOTHING
            "#,
        )
        .bind(session_token)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds a product to the session cart, merging with an existing line
    /// when product and personalization match exactly.
    ///
    /// ## Returns
    /// The ID of the (new or merged-into) cart line.
    ///
    /// ## Errors
    /// - [`DbError::Validation`] for a non-positive quantity, an oversized
    ///   personalization field, or when the merged quantity would exceed
    ///   the per-line cap
    /// - [`DbError::NotFound`] when the product doesn't exist or is inactive
    pub async fn add_item(
        &self,
        session_token: &str,
        product_id: &str,
        quantity: i64,
        personalization: Option<&Personalization>,
    ) -> DbResult<String> {
        if quantity <= 0 {
            return Err(bakeshop_core::ValidationError::InvalidQuantity { quantity }.into());
        }
        validate_quantity(quantity)?;

        // Personalization fields are free text from the checkout form;
        // length-check them before they hit storage
        if let Some(p) = personalization {
            validate_personalization_field("size", &p.size)?;
            validate_personalization_field("shape", &p.shape)?;
            if let Some(filling) = &p.filling {
                validate_personalization_field("filling", filling)?;
            }
            if let Some(toppings) = &p.toppings {
                validate_personalization_field("toppings", toppings)?;
            }
        }

        // Only active products can be added; inactive ones stay resolvable
        // for lines already in carts
        let product_exists: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM products WHERE id = ? AND is_active = 1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        if product_exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        self.ensure_cart(session_token).await?;

        let (size, shape, filling, toppings) = match personalization {
            Some(p) => (
                Some(p.size.as_str()),
                Some(p.shape.as_str()),
                p.filling.as_deref(),
                p.toppings.as_deref(),
            ),
            None => (None, None, None, None),
        };

        // Null-safe merge match: `IS` treats NULL = NULL as a match
        let existing: Option<(String, i64)> = sqlx::query_as(
            r#"
            SELECT id, quantity
            FROM cart_items
            WHERE session_token = ? AND product_id = ?
              AND size IS ? AND shape IS ? AND filling IS ? AND toppings IS ?
            "#,
        )
        .bind(session_token)
        .bind(product_id)
        .bind(size)
        .bind(shape)
        .bind(filling)
        .bind(toppings)
        .fetch_optional(&self.pool)
        .await?;

        let line_id = if let Some((id, current_qty)) = existing {
            let new_qty = current_qty + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(bakeshop_core::ValidationError::OutOfRange {
                    field: "quantity".to_string(),
                    min: 0,
                    max: MAX_ITEM_QUANTITY,
                }
                .into());
            }

            sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
                .bind(new_qty)
                .bind(&id)
                .execute(&self.pool)
                .await?;

            debug!(line_id = %id, quantity = new_qty, "Merged into existing cart line");
            id
        } else {
            let line_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM cart_items WHERE session_token = ?")
                    .bind(session_token)
                    .fetch_one(&self.pool)
                    .await?;
            validate_cart_size(line_count as usize)?;

            let id = Uuid::new_v4().to_string();
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, session_token, product_id, quantity,
                                        size, shape, filling, toppings, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(session_token)
            .bind(product_id)
            .bind(quantity)
            .bind(size)
            .bind(shape)
            .bind(filling)
            .bind(toppings)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

            debug!(line_id = %id, product_id = %product_id, quantity, "Cart line added");
            id
        };

        self.touch(session_token).await?;

        Ok(line_id)
    }

    /// Sets the quantity of a cart line.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the line
    /// - Negative quantity is rejected
    pub async fn set_quantity(
        &self,
        session_token: &str,
        line_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        validate_uuid(line_id)?;
        validate_quantity(quantity)?;

        if quantity == 0 {
            return self.remove_item(session_token, line_id).await;
        }

        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ? WHERE id = ? AND session_token = ?",
        )
        .bind(quantity)
        .bind(line_id)
        .bind(session_token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart line", line_id));
        }

        self.touch(session_token).await?;

        Ok(())
    }

    /// Removes a line from the session cart.
    pub async fn remove_item(&self, session_token: &str, line_id: &str) -> DbResult<()> {
        validate_uuid(line_id)?;

        let result =
            sqlx::query("DELETE FROM cart_items WHERE id = ? AND session_token = ?")
                .bind(line_id)
                .bind(session_token)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart line", line_id));
        }

        self.touch(session_token).await?;

        Ok(())
    }

    /// Removes all lines of the session cart (after checkout, or on demand).
    pub async fn clear(&self, session_token: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE session_token = ?")
            .bind(session_token)
            .execute(&self.pool)
            .await?;

        info!(session = %session_token, "Cart cleared");

        Ok(())
    }

    /// Loads the cart lines for a session, joined with live catalog data.
    ///
    /// This is the pricing-engine input: every cart view and every checkout
    /// starts here, so prices always reflect the current catalog.
    pub async fn load_lines(&self, session_token: &str) -> DbResult<Vec<CartLineItem>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r#"
            SELECT ci.id, ci.product_id, p.name, p.kind, p.base_price_cents,
                   ci.quantity, ci.size, ci.shape, ci.filling, ci.toppings
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.session_token = ?
            ORDER BY ci.created_at
            "#,
        )
        .bind(session_token)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CartLineRow::into_line_item).collect()
    }

    /// Bumps the cart's updated_at timestamp.
    async fn touch(&self, session_token: &str) -> DbResult<()> {
        sqlx::query("UPDATE carts SET updated_at = ? WHERE session_token = ?")
            .bind(Utc::now())
            .bind(session_token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, kind: ProductKind) -> String {
        db.products()
            .create(NewProduct {
                name: match kind {
                    ProductKind::Standard => "Personalized brownie".to_string(),
                    ProductKind::ClearanceRestock => "Second-chance brownie".to_string(),
                },
                description: None,
                kind,
                base_price_cents: 590,
            })
            .await
            .unwrap()
            .id
    }

    fn heart_shaped() -> Personalization {
        Personalization {
            size: "classic".to_string(),
            shape: "heart".to_string(),
            filling: None,
            toppings: Some("walnuts".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_and_load_lines() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        carts
            .add_item("session-1", &product_id, 3, Some(&heart_shaped()))
            .await
            .unwrap();

        let lines = carts.load_lines("session-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].name, "Personalized brownie");
        assert_eq!(lines[0].unit_base_price.cents(), 590);
        assert_eq!(
            lines[0].personalization.as_ref().unwrap().shape,
            "heart"
        );
    }

    #[tokio::test]
    async fn test_add_merges_equal_personalization() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        let first = carts
            .add_item("session-1", &product_id, 2, Some(&heart_shaped()))
            .await
            .unwrap();
        let second = carts
            .add_item("session-1", &product_id, 3, Some(&heart_shaped()))
            .await
            .unwrap();

        assert_eq!(first, second); // merged into the same line

        let lines = carts.load_lines("session-1").await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_keeps_distinct_personalization_apart() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        carts
            .add_item("session-1", &product_id, 2, Some(&heart_shaped()))
            .await
            .unwrap();
        carts
            .add_item("session-1", &product_id, 3, None)
            .await
            .unwrap();

        let lines = carts.load_lines("session-1").await.unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_session() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        carts
            .add_item("session-1", &product_id, 2, None)
            .await
            .unwrap();
        carts
            .add_item("session-2", &product_id, 7, None)
            .await
            .unwrap();

        assert_eq!(carts.load_lines("session-1").await.unwrap().len(), 1);
        assert_eq!(
            carts.load_lines("session-2").await.unwrap()[0].quantity,
            7
        );
    }

    #[tokio::test]
    async fn test_set_quantity_zero_removes_line() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        let line_id = carts
            .add_item("session-1", &product_id, 2, None)
            .await
            .unwrap();
        carts.set_quantity("session-1", &line_id, 0).await.unwrap();

        assert!(carts.load_lines("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_inactive_product() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        db.products().deactivate(&product_id).await.unwrap();

        let err = db
            .carts()
            .add_item("session-1", &product_id, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_quantity() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;

        let err = db
            .carts()
            .add_item("session-1", &product_id, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_add_rejects_oversized_personalization() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;

        let mut oversized = heart_shaped();
        oversized.toppings = Some("x".repeat(10_000));

        let err = db
            .carts()
            .add_item("session-1", &product_id, 1, Some(&oversized))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        // Nothing was persisted
        assert!(db.carts().load_lines("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        carts
            .add_item("session-1", &product_id, 2, None)
            .await
            .unwrap();
        carts.clear("session-1").await.unwrap();

        assert!(carts.load_lines("session-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_price_change_reflected_on_next_load() {
        let db = test_db().await;
        let product_id = seed_product(&db, ProductKind::Standard).await;
        let carts = db.carts();

        carts
            .add_item("session-1", &product_id, 2, None)
            .await
            .unwrap();
        db.products().update_price(&product_id, 650).await.unwrap();

        let lines = carts.load_lines("session-1").await.unwrap();
        assert_eq!(lines[0].unit_base_price.cents(), 650);
    }
}
