//! # bakeshop-core: Pure Business Logic for the Bakeshop Backend
//!
//! This crate is the **heart** of the Bakeshop order backend. It contains
//! all business logic as pure functions with zero I/O dependencies — above
//! all the cart pricing engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bakeshop Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Surface (outside workspace)                 │   │
//! │  │    Catalog page ──► Cart view ──► Checkout ──► Confirmation     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bakeshop-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │   cart    │  │   │
//! │  │   │  Product  │  │   Money   │  │  Engine   │  │   Cart    │  │   │
//! │  │   │   Order   │  │   Rate    │  │  Totals   │  │ LineItem  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO WALL CLOCK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bakeshop-db (Database Layer)                   │   │
//! │  │          SQLite: catalog, session carts, orders                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pricing`] - The cart pricing engine (discount tiers, weekday gate,
//!   staged rounding)
//! - [`money`] - Money type backed by exact decimal arithmetic
//! - [`cart`] - Session cart and its validated line items
//! - [`types`] - Domain types (Product, Order, Customer, Rate, ...)
//! - [`validation`] - Boundary validation of user-submitted data
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same lines + same `now` = identical breakdown
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **No Wall Clock**: the weekday gate is decided from an injected
//!    timestamp so tests can simulate any weekday
//! 4. **Explicit Rounding**: half-up at 2 digits after each stage, never
//!    implicitly
//!
//! ## Example Usage
//!
//! ```rust
//! use bakeshop_core::cart::CartLineItem;
//! use bakeshop_core::pricing::{PricingConfig, PricingEngine};
//! use bakeshop_core::types::ProductKind;
//! use chrono::Utc;
//!
//! let engine = PricingEngine::new(PricingConfig::default());
//!
//! // 7 personalized brownies at 5.90 → 5% tier
//! let line = CartLineItem::new(
//!     "line-1", "prod-1", "Personalized brownie",
//!     ProductKind::Standard, 590, 7, None,
//! )?;
//!
//! let priced = engine.price_cart(&[line], Utc::now());
//! assert_eq!(priced.items[0].line_total.cents(), 3924); // 5.605 × 7 → 39.24
//! # Ok::<(), bakeshop_core::ValidationError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bakeshop_core::Money` instead of
// `use bakeshop_core::money::Money`

pub use cart::{Cart, CartLineItem};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{CartTotals, PricedCart, PricedLineItem, PricingConfig, PricingEngine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway session carts and keeps order documents a sane size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
