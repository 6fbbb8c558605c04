//! # Domain Types
//!
//! Core domain types used throughout the Bakeshop backend.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  kind           │   │  order_number   │   │  order_id (FK)  │       │
//! │  │  name           │   │  status         │   │  name_snapshot  │       │
//! │  │  base_price_¢   │   │  total_cents    │   │  line_total_¢   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rate       │   │  ProductKind    │   │   OrderStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Standard       │   │  Placed         │       │
//! │  │  1900 = 19%     │   │  Clearance-     │   │  Completed      │       │
//! │  └─────────────────┘   │    Restock      │   │  Cancelled      │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (order_number) - human-readable

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Rate
// =============================================================================

/// A fractional rate (discount or tax) in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1900 bps = 19% (German VAT), 500 bps = the 5% quantity tier.
/// Integer storage keeps rates exact in configuration and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Creates a rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        Rate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as an exact decimal fraction (1900 bps → 0.19).
    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

// =============================================================================
// Product Kind
// =============================================================================

/// Which discount rule family applies to a product.
///
/// ## The Two Families
/// - `Standard`: a personalized product line, eligible for quantity-based
///   discount tiers (5+ → 5%, 10+ → 10%)
/// - `ClearanceRestock`: leftover stock sold at a fixed 25% off, never
///   eligible for quantity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Personalized product, quantity tiers apply.
    Standard,
    /// Discounted leftover stock, fixed clearance rate applies.
    ClearanceRestock,
}

impl Default for ProductKind {
    fn default() -> Self {
        ProductKind::Standard
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the shop and on the order.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Discount rule family for this product.
    pub kind: ProductKind,

    /// Base price per unit in cents (smallest currency unit).
    /// Fixed per product, never user-supplied.
    pub base_price_cents: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the base price as a Money type.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }
}

// =============================================================================
// Personalization
// =============================================================================

/// Customer-chosen attributes of a personalized line.
///
/// Carried through pricing untouched; only `quantity` and the product's
/// kind and base price influence the computed amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Size choice (e.g. "classic", "family").
    pub size: String,

    /// Shape choice (e.g. "square", "heart").
    pub shape: String,

    /// Optional filling.
    pub filling: Option<String>,

    /// Optional toppings, free text.
    pub toppings: Option<String>,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer placing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub address: String,
    /// Unique per customer; checkout reuses the existing row on match.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of a persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order was checked out and persisted.
    Placed,
    /// Order was baked, shipped and paid.
    Completed,
    /// Order was cancelled.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Placed
    }
}

// =============================================================================
// Order
// =============================================================================

/// A persisted order, written once at checkout.
///
/// All monetary columns are the rounded cent values of the `CartTotals`
/// computed at checkout time. The breakdown is stored (not just the grand
/// total) so the order confirmation can re-render it without re-pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    /// Human-readable business identifier, e.g. `20260829-0421`.
    pub order_number: String,
    pub customer_id: String,
    pub status: OrderStatus,
    /// Subtotal after item and weekday discounts.
    pub subtotal_cents: i64,
    /// Weekday discount actually subtracted (0 when the gate was closed).
    pub time_discount_cents: i64,
    pub shipping_cents: i64,
    pub tax_cents: i64,
    /// Total savings: item discounts plus weekday discount.
    pub discount_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line item in a persisted order.
/// Uses snapshot pattern to freeze product data at time of checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of checkout (frozen).
    pub name_snapshot: String,
    /// Discount rule family at time of checkout (frozen).
    pub kind: ProductKind,
    /// Base unit price in cents at time of checkout (frozen).
    pub unit_price_cents: i64,
    /// Quantity ordered.
    pub quantity: i64,
    /// Rounded line total after per-item discount.
    pub line_total_cents: i64,
    /// Rounded per-line savings against the base price.
    pub discount_cents: i64,
    /// Personalization snapshot (NULL columns for clearance lines).
    pub size: Option<String>,
    pub shape: Option<String>,
    pub filling: Option<String>,
    pub toppings: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen base unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
