//! # bakeshop-db: Database Layer for the Bakeshop Backend
//!
//! SQLite persistence for the catalog, session carts, customers and
//! orders. All business logic lives in `bakeshop-core`; this crate only
//! moves validated data in and out of the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bakeshop Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Surface (outside workspace)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bakeshop-core (Pure Business Logic)                │   │
//! │  │                  PricingEngine • Cart • Money                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bakeshop-db (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌──────────────────────┐    │   │
//! │  │   │   pool    │  │ migrations  │  │     repository       │    │   │
//! │  │   │ Database  │  │  embedded   │  │ products/carts/orders│    │   │
//! │  │   │ DbConfig  │  │  SQL files  │  │                      │    │   │
//! │  │   └───────────┘  └─────────────┘  └──────────────────────┘    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                          ┌─────▼─────┐                                  │
//! │                          │  SQLite   │  (WAL mode)                      │
//! │                          └───────────┘                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bakeshop_db::{Database, DbConfig};
//! use bakeshop_core::pricing::{PricingConfig, PricingEngine};
//! use chrono::Utc;
//!
//! let db = Database::new(DbConfig::new("./bakeshop.db")).await?;
//! let engine = PricingEngine::new(PricingConfig::default());
//!
//! // Cart view: load choices, price fresh
//! let lines = db.carts().load_lines(&session_token).await?;
//! let priced = engine.price_cart(&lines, Utc::now());
//!
//! // Checkout: priced cart becomes a permanent order
//! let order = db.orders().place_order(&customer, &priced, Utc::now()).await?;
//! db.carts().clear(&session_token).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{CartRepository, NewCustomer, NewProduct, OrderRepository, ProductRepository};
