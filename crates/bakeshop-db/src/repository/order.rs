//! # Order Repository
//!
//! Checkout persistence: turning a priced cart into a permanent order.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                place_order(customer, priced_cart, now)                  │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │    1. Find customer by email, or create one                             │
//! │    2. Generate order number (date + daily sequence)                     │
//! │    3. INSERT order row   ◄── cents from CartTotals, already rounded    │
//! │    4. INSERT order_items ◄── snapshot of name / kind / base price      │
//! │       (zero-quantity lines are skipped; they priced to zero)           │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  All-or-nothing: a failure anywhere leaves no partial order behind.    │
//! │  Clearing the session cart afterwards is the caller's job.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why the Repository Takes a PricedCart
//! Only the pricing engine produces `PricedCart` values, so an order can
//! only ever be written from amounts the engine computed. Client-submitted
//! totals have no path into this table.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use bakeshop_core::pricing::PricedCart;
use bakeshop_core::types::{Customer, Order, OrderItem, OrderStatus};
use bakeshop_core::validation::{validate_email, validate_uuid};

use crate::error::{DbError, DbResult};

// =============================================================================
// Input Types
// =============================================================================

/// Customer data collected by the checkout form.
///
/// Matched against existing customers by email; name and address are
/// taken as submitted for a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub address: String,
    pub email: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order and customer operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new order repository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Persists a priced cart as an order, atomically.
    ///
    /// `now` must be the same instant the cart was priced with, so the
    /// stored weekday discount matches what the customer was shown.
    ///
    /// ## Errors
    /// - [`DbError::EmptyOrder`] when the cart has no orderable lines
    /// - [`DbError::Validation`] for a malformed customer email
    pub async fn place_order(
        &self,
        customer: &NewCustomer,
        priced: &PricedCart,
        now: DateTime<Utc>,
    ) -> DbResult<Order> {
        validate_email(&customer.email)?;

        // Zero-quantity lines price to zero and are not worth persisting
        let orderable: Vec<_> = priced.items.iter().filter(|p| p.item.quantity > 0).collect();
        if orderable.is_empty() {
            return Err(DbError::EmptyOrder);
        }

        let mut tx = self.pool.begin().await?;

        let customer_id = find_or_create_customer(&mut tx, customer, now).await?;
        let order_number = generate_order_number(&mut tx, now).await?;

        let totals = &priced.totals;
        let order = Order {
            id: Uuid::new_v4().to_string(),
            order_number,
            customer_id,
            status: OrderStatus::Placed,
            subtotal_cents: totals.subtotal.cents(),
            time_discount_cents: totals.time_discount_amount.cents(),
            shipping_cents: totals.shipping_fee.cents(),
            tax_cents: totals.tax_amount.cents(),
            discount_cents: totals.total_discount.cents(),
            total_cents: totals.grand_total.cents(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, customer_id, status,
                                subtotal_cents, time_discount_cents, shipping_cents,
                                tax_cents, discount_cents, total_cents,
                                created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.customer_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.time_discount_cents)
        .bind(order.shipping_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.total_cents)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for priced_line in orderable {
            let item = &priced_line.item;
            let (size, shape, filling, toppings) = match &item.personalization {
                Some(p) => (
                    Some(p.size.clone()),
                    Some(p.shape.clone()),
                    p.filling.clone(),
                    p.toppings.clone(),
                ),
                None => (None, None, None, None),
            };

            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, name_snapshot, kind,
                                         unit_price_cents, quantity, line_total_cents,
                                         discount_cents, size, shape, filling, toppings,
                                         created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.kind)
            .bind(item.unit_base_price.cents())
            .bind(item.quantity)
            .bind(priced_line.line_total.cents())
            .bind(priced_line.line_discount_amount.cents())
            .bind(size)
            .bind(shape)
            .bind(filling)
            .bind(toppings)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_number = %order.order_number,
            total_cents = order.total_cents,
            "Order placed"
        );

        Ok(order)
    }

    /// Gets an order by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Order> {
        validate_uuid(id)?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, customer_id, status,
                   subtotal_cents, time_discount_cents, shipping_cents,
                   tax_cents, discount_cents, total_cents,
                   created_at, updated_at
            FROM orders
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))?;

        Ok(order)
    }

    /// Gets an order by its human-readable order number.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Order> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, customer_id, status,
                   subtotal_cents, time_discount_cents, shipping_cents,
                   tax_cents, discount_cents, total_cents,
                   created_at, updated_at
            FROM orders
            WHERE order_number = ?
            "#,
        )
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_number))?;

        Ok(order)
    }

    /// Gets the line items of an order (the frozen snapshot).
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, name_snapshot, kind,
                   unit_price_cents, quantity, line_total_cents, discount_cents,
                   size, shape, filling, toppings, created_at
            FROM order_items
            WHERE order_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, customer_id, status,
                   subtotal_cents, time_discount_cents, shipping_cents,
                   tax_cents, discount_cents, total_cents,
                   created_at, updated_at
            FROM orders
            WHERE customer_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(customer_id = %customer_id, count = orders.len(), "Listed orders");

        Ok(orders)
    }

    /// Updates an order's status.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        validate_uuid(id)?;

        let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(order_id = %id, ?status, "Order status updated");

        self.get_by_id(id).await
    }

    /// Gets a customer by email, if one exists.
    pub async fn get_customer_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, address, email, created_at FROM customers WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Finds a customer by email within the transaction, creating one if absent.
async fn find_or_create_customer(
    tx: &mut Transaction<'_, Sqlite>,
    customer: &NewCustomer,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM customers WHERE email = ?")
        .bind(&customer.email)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some(id) = existing {
        debug!(customer_id = %id, "Reusing existing customer");
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO customers (id, name, address, email, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&customer.name)
    .bind(&customer.address)
    .bind(&customer.email)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    debug!(customer_id = %id, "Customer created");

    Ok(id)
}

/// Generates the next order number for the day: `YYYYMMDD-NNNN`.
///
/// The sequence restarts daily and is backed by a counter row in
/// `order_counters`, bumped inside the checkout transaction. Concurrent
/// checkouts serialize on that row, so two transactions cannot take the
/// same number, and a removed order never frees its number for reuse.
async fn generate_order_number(
    tx: &mut Transaction<'_, Sqlite>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let day = now.format("%Y%m%d").to_string();

    let seq: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO order_counters (day, seq)
        VALUES (?, 1)
        ON CONFLICT (day) DO UPDATE SET seq = seq + 1
        RETURNING seq
        "#,
    )
    .bind(&day)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("{day}-{seq:04}"))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use bakeshop_core::pricing::{PricingConfig, PricingEngine};
    use bakeshop_core::types::{Personalization, ProductKind};
    use chrono::TimeZone;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn jane() -> NewCustomer {
        NewCustomer {
            name: "Jane Doe".to_string(),
            address: "1 Baker Street".to_string(),
            email: "jane@example.com".to_string(),
        }
    }

    /// A Friday: the weekday discount gate is closed.
    fn friday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 28, 12, 0, 0).unwrap()
    }

    async fn seed_catalog(db: &Database) -> (String, String) {
        let products = db.products();
        let standard = products
            .create(NewProduct {
                name: "Personalized brownie".to_string(),
                description: None,
                kind: ProductKind::Standard,
                base_price_cents: 590,
            })
            .await
            .unwrap();
        let clearance = products
            .create(NewProduct {
                name: "Second-chance brownie".to_string(),
                description: None,
                kind: ProductKind::ClearanceRestock,
                base_price_cents: 590,
            })
            .await
            .unwrap();
        (standard.id, clearance.id)
    }

    /// Full checkout path: cart rows → load → price → place_order.
    #[tokio::test]
    async fn test_place_order_from_priced_cart() {
        let db = test_db().await;
        let (standard_id, clearance_id) = seed_catalog(&db).await;
        let carts = db.carts();

        carts
            .add_item(
                "session-1",
                &standard_id,
                7,
                Some(&Personalization {
                    size: "classic".to_string(),
                    shape: "square".to_string(),
                    filling: None,
                    toppings: None,
                }),
            )
            .await
            .unwrap();
        carts
            .add_item("session-1", &clearance_id, 3, None)
            .await
            .unwrap();

        let lines = carts.load_lines("session-1").await.unwrap();
        let config = PricingConfig {
            shipping_fee: bakeshop_core::Money::from_cents(590),
            ..PricingConfig::default()
        };
        let engine = PricingEngine::new(config);
        let priced = engine.price_cart(&lines, friday());

        let order = db.orders().place_order(&jane(), &priced, friday()).await.unwrap();

        // 7 × 5.605 → 39.24, 3 × 4.425 → 13.28; subtotal 52.52
        // tax 9.98, shipping 5.90, grand total 68.40
        assert_eq!(order.subtotal_cents, 5252);
        assert_eq!(order.time_discount_cents, 0);
        assert_eq!(order.shipping_cents, 590);
        assert_eq!(order.tax_cents, 998);
        assert_eq!(order.total_cents, 6840);
        assert_eq!(order.discount_cents, 650);
        assert_eq!(order.status, OrderStatus::Placed);

        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 2);

        let standard_item = items.iter().find(|i| i.product_id == standard_id).unwrap();
        assert_eq!(standard_item.name_snapshot, "Personalized brownie");
        assert_eq!(standard_item.unit_price_cents, 590);
        assert_eq!(standard_item.line_total_cents, 3924);
        assert_eq!(standard_item.size.as_deref(), Some("classic"));

        let clearance_item = items.iter().find(|i| i.product_id == clearance_id).unwrap();
        assert_eq!(clearance_item.kind, ProductKind::ClearanceRestock);
        assert_eq!(clearance_item.line_total_cents, 1328);
        assert!(clearance_item.size.is_none());
    }

    #[tokio::test]
    async fn test_order_number_sequence() {
        let db = test_db().await;
        let (standard_id, _) = seed_catalog(&db).await;
        let carts = db.carts();
        let engine = PricingEngine::new(PricingConfig::default());

        carts
            .add_item("session-1", &standard_id, 2, None)
            .await
            .unwrap();
        let lines = carts.load_lines("session-1").await.unwrap();
        let priced = engine.price_cart(&lines, friday());

        let first = db.orders().place_order(&jane(), &priced, friday()).await.unwrap();
        let second = db.orders().place_order(&jane(), &priced, friday()).await.unwrap();

        assert_eq!(first.order_number, "20260828-0001");
        assert_eq!(second.order_number, "20260828-0002");
    }

    /// The sequence comes from the counter row, not from counting order
    /// rows: removing an order must never free its number for reuse.
    #[tokio::test]
    async fn test_order_numbers_never_reused() {
        let db = test_db().await;
        let (standard_id, _) = seed_catalog(&db).await;
        let carts = db.carts();
        let engine = PricingEngine::new(PricingConfig::default());

        carts
            .add_item("session-1", &standard_id, 2, None)
            .await
            .unwrap();
        let lines = carts.load_lines("session-1").await.unwrap();
        let priced = engine.price_cart(&lines, friday());

        let orders = db.orders();
        let first = orders.place_order(&jane(), &priced, friday()).await.unwrap();
        let second = orders.place_order(&jane(), &priced, friday()).await.unwrap();
        assert_eq!(second.order_number, "20260828-0002");

        // Drop the second order entirely (items first, FK)
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(&second.id)
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(&second.id)
            .execute(db.pool())
            .await
            .unwrap();

        let third = orders.place_order(&jane(), &priced, friday()).await.unwrap();
        assert_eq!(first.order_number, "20260828-0001");
        assert_eq!(third.order_number, "20260828-0003");
    }

    #[tokio::test]
    async fn test_customer_reused_by_email() {
        let db = test_db().await;
        let (standard_id, _) = seed_catalog(&db).await;
        let carts = db.carts();
        let engine = PricingEngine::new(PricingConfig::default());

        carts
            .add_item("session-1", &standard_id, 1, None)
            .await
            .unwrap();
        let lines = carts.load_lines("session-1").await.unwrap();
        let priced = engine.price_cart(&lines, friday());

        let first = db.orders().place_order(&jane(), &priced, friday()).await.unwrap();

        // Same email, different name: existing customer row wins
        let mut again = jane();
        again.name = "J. Doe".to_string();
        let second = db.orders().place_order(&again, &priced, friday()).await.unwrap();

        assert_eq!(first.customer_id, second.customer_id);

        let customer = db
            .orders()
            .get_customer_by_email("jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.name, "Jane Doe");

        let history = db.orders().list_for_customer(&customer.id).await.unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn test_place_order_rejects_empty_cart() {
        let db = test_db().await;
        let engine = PricingEngine::new(PricingConfig::default());
        let priced = engine.price_cart(&[], friday());

        let err = db
            .orders()
            .place_order(&jane(), &priced, friday())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::EmptyOrder));
    }

    #[tokio::test]
    async fn test_place_order_rejects_bad_email() {
        let db = test_db().await;
        let engine = PricingEngine::new(PricingConfig::default());
        let priced = engine.price_cart(&[], friday());

        let mut customer = jane();
        customer.email = "not-an-email".to_string();

        let err = db
            .orders()
            .place_order(&customer, &priced, friday())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_weekday_discount_stored_on_order() {
        let db = test_db().await;
        let (standard_id, _) = seed_catalog(&db).await;
        let carts = db.carts();
        let engine = PricingEngine::new(PricingConfig::default());

        carts
            .add_item("session-1", &standard_id, 10, None)
            .await
            .unwrap();
        let lines = carts.load_lines("session-1").await.unwrap();

        // 2026-08-26 is a Wednesday: gate open
        let wednesday = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap();
        let priced = engine.price_cart(&lines, wednesday);

        let order = db
            .orders()
            .place_order(&jane(), &priced, wednesday)
            .await
            .unwrap();

        // line 53.10, weekday 10% → 5.31, subtotal 47.79
        assert_eq!(order.time_discount_cents, 531);
        assert_eq!(order.subtotal_cents, 4779);
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = test_db().await;
        let (standard_id, _) = seed_catalog(&db).await;
        let carts = db.carts();
        let engine = PricingEngine::new(PricingConfig::default());

        carts
            .add_item("session-1", &standard_id, 1, None)
            .await
            .unwrap();
        let lines = carts.load_lines("session-1").await.unwrap();
        let priced = engine.price_cart(&lines, friday());
        let order = db.orders().place_order(&jane(), &priced, friday()).await.unwrap();

        let cancelled = db
            .orders()
            .update_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let fetched = db.orders().get_by_number(&order.order_number).await.unwrap();
        assert_eq!(fetched.status, OrderStatus::Cancelled);
    }
}
