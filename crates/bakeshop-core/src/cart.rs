//! # Cart Module
//!
//! The session shopping cart and its line items.
//!
//! ## Design Notes
//! The cart is a plain value type, never a shared structure mutated
//! across request handlers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle (per request)                         │
//! │                                                                         │
//! │  Session store ──► Vec<CartLineItem> ──► PricingEngine::price_cart()   │
//! │   (bakeshop-db)      (immutable input)        (fresh PricedCart)       │
//! │                                                                         │
//! │  Line items are constructed fresh from stored state on EVERY pricing   │
//! │  request. Priced results are never written back into the cart: the     │
//! │  weekday gate and the catalog can change between requests.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CartLineItem::new` is the validation boundary of the pricing engine:
//! negative quantities and non-positive base prices are rejected here, so
//! the engine itself is a total function over well-formed input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Personalization, Product, ProductKind};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line Item
// =============================================================================

/// One line of the cart, immutable per pricing computation.
///
/// ## Price Freezing
/// The base price is snapshotted from the catalog when the line is built.
/// A line with `quantity == 0` is valid input: it prices to zero and the
/// caller is expected to drop it from the cart afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Cart line ID (UUID), stable across session round-trips.
    pub id: String,

    /// Catalog product this line refers to.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Discount rule family, copied from the product.
    pub kind: ProductKind,

    /// Base price per unit, positive, never user-supplied.
    pub unit_base_price: Money,

    /// Number of units, non-negative.
    pub quantity: i64,

    /// Personalization choices; irrelevant to pricing, carried through.
    pub personalization: Option<Personalization>,
}

impl CartLineItem {
    /// Builds a validated cart line from its raw parts.
    ///
    /// This is where the `InvalidQuantity` / `InvalidPrice` boundary
    /// checks live. The pricing engine assumes lines passed to it came
    /// through here (or `from_product`) and never re-validates.
    ///
    /// ## Errors
    /// - [`ValidationError::InvalidQuantity`] if `quantity < 0`
    /// - [`ValidationError::InvalidPrice`] if `base_price_cents <= 0`
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        name: impl Into<String>,
        kind: ProductKind,
        base_price_cents: i64,
        quantity: i64,
        personalization: Option<Personalization>,
    ) -> Result<Self, ValidationError> {
        if quantity < 0 {
            return Err(ValidationError::InvalidQuantity { quantity });
        }
        if base_price_cents <= 0 {
            return Err(ValidationError::InvalidPrice {
                cents: base_price_cents,
            });
        }

        Ok(CartLineItem {
            id: id.into(),
            product_id: product_id.into(),
            name: name.into(),
            kind,
            unit_base_price: Money::from_cents(base_price_cents),
            quantity,
            personalization,
        })
    }

    /// Builds a cart line from a catalog product, generating a line ID.
    pub fn from_product(
        product: &Product,
        quantity: i64,
        personalization: Option<Personalization>,
    ) -> Result<Self, ValidationError> {
        CartLineItem::new(
            Uuid::new_v4().to_string(),
            product.id.clone(),
            product.name.clone(),
            product.kind,
            product.base_price_cents,
            quantity,
            personalization,
        )
    }

    /// True when this line would merge with another on add
    /// (same product, same personalization).
    fn merges_with(&self, other: &CartLineItem) -> bool {
        self.product_id == other.product_id && self.personalization == other.personalization
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The session shopping cart.
///
/// ## Invariants
/// - Adding an equal product + personalization combination increases the
///   existing line's quantity instead of creating a duplicate line
/// - Updating a quantity to 0 removes the line
/// - Maximum lines: [`MAX_CART_ITEMS`], maximum quantity per line:
///   [`MAX_ITEM_QUANTITY`]
///
/// The cart never stores computed prices; totals come from the pricing
/// engine on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in the cart, in insertion order.
    items: Vec<CartLineItem>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rebuilds a cart from stored session lines.
    pub fn from_items(items: Vec<CartLineItem>, created_at: DateTime<Utc>) -> Self {
        Cart { items, created_at }
    }

    /// Adds a line to the cart, merging with an equal line if present.
    ///
    /// ## Behavior
    /// - Equal product + personalization already in cart: quantities add up
    /// - Otherwise: the line is appended
    pub fn add_item(&mut self, line: CartLineItem) -> CoreResult<()> {
        if let Some(existing) = self.items.iter_mut().find(|i| i.merges_with(&line)) {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        if line.quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        self.items.push(line);
        Ok(())
    }

    /// Updates the quantity of a line by its ID.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the line
    /// - Negative quantity is rejected at this boundary
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity < 0 {
            return Err(ValidationError::InvalidQuantity { quantity }.into());
        }
        if quantity == 0 {
            return self.remove_item(line_id);
        }
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.id == line_id) {
            Some(line) => {
                line.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::LineNotFound(line_id.to_string())),
        }
    }

    /// Removes a line from the cart by its ID.
    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != line_id);

        if self.items.len() == initial_len {
            Err(CoreError::LineNotFound(line_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    /// Returns the lines, the input expected by the pricing engine.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn brownie(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Personalized brownie".to_string(),
            description: None,
            kind: ProductKind::Standard,
            base_price_cents: 590,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn heart_shaped() -> Option<Personalization> {
        Some(Personalization {
            size: "classic".to_string(),
            shape: "heart".to_string(),
            filling: None,
            toppings: Some("walnuts".to_string()),
        })
    }

    #[test]
    fn test_line_item_rejects_negative_quantity() {
        let err = CartLineItem::from_product(&brownie("1"), -1, None).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidQuantity { quantity: -1 }
        ));
    }

    #[test]
    fn test_line_item_rejects_non_positive_price() {
        let mut product = brownie("1");
        product.base_price_cents = 0;
        let err = CartLineItem::from_product(&product, 2, None).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPrice { cents: 0 }));
    }

    #[test]
    fn test_line_item_allows_zero_quantity() {
        // Zero prices to a zero line; dropping it is the caller's job
        let line = CartLineItem::from_product(&brownie("1"), 0, None).unwrap();
        assert_eq!(line.quantity, 0);
    }

    #[test]
    fn test_cart_add_item() {
        let mut cart = Cart::new();
        let line = CartLineItem::from_product(&brownie("1"), 2, heart_shaped()).unwrap();

        cart.add_item(line).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
    }

    #[test]
    fn test_cart_merges_equal_personalization() {
        let mut cart = Cart::new();
        let product = brownie("1");
        let a = CartLineItem::from_product(&product, 2, heart_shaped()).unwrap();
        let b = CartLineItem::from_product(&product, 3, heart_shaped()).unwrap();

        cart.add_item(a).unwrap();
        cart.add_item(b).unwrap();

        assert_eq!(cart.line_count(), 1); // merged
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_cart_keeps_distinct_personalization_apart() {
        let mut cart = Cart::new();
        let product = brownie("1");
        let a = CartLineItem::from_product(&product, 2, heart_shaped()).unwrap();
        let b = CartLineItem::from_product(&product, 3, None).unwrap();

        cart.add_item(a).unwrap();
        cart.add_item(b).unwrap();

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_cart_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let line = CartLineItem::from_product(&brownie("1"), 2, None).unwrap();
        let line_id = line.id.clone();

        cart.add_item(line).unwrap();
        cart.update_quantity(&line_id, 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_cart_update_quantity_unknown_line() {
        let mut cart = Cart::new();
        let err = cart.update_quantity("missing", 3).unwrap_err();
        assert!(matches!(err, CoreError::LineNotFound(_)));
    }

    #[test]
    fn test_cart_quantity_cap() {
        let mut cart = Cart::new();
        let line = CartLineItem::from_product(&brownie("1"), MAX_ITEM_QUANTITY, None).unwrap();
        cart.add_item(line).unwrap();

        let extra = CartLineItem::from_product(&brownie("1"), 1, None).unwrap();
        let err = cart.add_item(extra).unwrap_err();
        assert!(matches!(err, CoreError::QuantityTooLarge { .. }));
    }

    #[test]
    fn test_cart_clear() {
        let mut cart = Cart::new();
        let line = CartLineItem::from_product(&brownie("1"), 2, None).unwrap();

        cart.add_item(line).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
    }
}
