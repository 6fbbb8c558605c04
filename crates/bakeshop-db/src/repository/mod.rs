//! # Repository Modules
//!
//! Data access, one repository per aggregate.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Layer                                   │
//! │                                                                         │
//! │  ProductRepository ──► products            (catalog, soft deletes)     │
//! │  CartRepository    ──► carts, cart_items   (per session token)         │
//! │  OrderRepository   ──► orders, order_items (written once at checkout)  │
//! │                        customers           (find-or-create by email)   │
//! │                                                                         │
//! │  Repositories translate between SQL rows and bakeshop-core types.      │
//! │  They never compute prices: a loaded cart goes through the pricing     │
//! │  engine, and only a PricedCart can become an order.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod order;
pub mod product;

pub use cart::CartRepository;
pub use order::{NewCustomer, OrderRepository};
pub use product::{NewProduct, ProductRepository};
