//! # Cart Pricing Engine
//!
//! Turns a snapshot of cart lines into a fully itemized price breakdown.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       price_cart(lines, now)                            │
//! │                                                                         │
//! │  For each line:                                                         │
//! │    discount rate ◄── kind + quantity tier                              │
//! │    unit price    ◄── base × (1 - rate)        (unrounded)              │
//! │    line_total    ◄── unit × quantity          (rounded, half-up)       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  subtotal_before_time_discount = Σ line_total                          │
//! │         │                                                               │
//! │         ▼  weekday gate open? (decided from `now`)                     │
//! │  time_discount = round(subtotal_before × rate)                         │
//! │  subtotal      = subtotal_before - time_discount                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  tax         = round(subtotal × tax_rate)     (shipping NOT taxed)     │
//! │  grand_total = round(subtotal + shipping + tax)                        │
//! │                                                                         │
//! │  Ordering matters: the weekday discount applies to the already         │
//! │  item-discounted subtotal, and rounding happens after each stage.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! The engine holds only its configuration. It performs no I/O, reads no
//! clock (the caller injects `now`), and mutates nothing: the same lines
//! and the same `now` always produce the identical breakdown. It is safe
//! to call concurrently from any number of requests.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::cart::CartLineItem;
use crate::money::Money;
use crate::types::{ProductKind, Rate};

// =============================================================================
// Configuration
// =============================================================================

/// Pricing policy knobs, passed into the engine explicitly.
///
/// Rates live here instead of in module-level constants so tests can
/// override any of them without touching process-wide state.
#[derive(Debug, Clone)]
pub struct PricingConfig {
    /// Minimum quantity for the small bulk tier.
    pub bulk_small_min_qty: i64,
    /// Discount for the small bulk tier (default 5%).
    pub bulk_small_rate: Rate,
    /// Minimum quantity for the large bulk tier.
    pub bulk_large_min_qty: i64,
    /// Discount for the large bulk tier (default 10%).
    pub bulk_large_rate: Rate,
    /// Fixed discount for clearance-restock lines (default 25%).
    pub clearance_rate: Rate,
    /// Weekday on which the store-wide discount is active.
    pub weekday_discount_day: Weekday,
    /// Store-wide discount rate on that weekday (default 10%).
    pub weekday_discount_rate: Rate,
    /// Flat shipping fee, independent of cart size.
    pub shipping_fee: Money,
    /// VAT rate applied to the discounted subtotal (default 19%).
    pub tax_rate: Rate,
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            bulk_small_min_qty: 5,
            bulk_small_rate: Rate::from_bps(500),
            bulk_large_min_qty: 10,
            bulk_large_rate: Rate::from_bps(1000),
            clearance_rate: Rate::from_bps(2500),
            weekday_discount_day: Weekday::Wed,
            weekday_discount_rate: Rate::from_bps(1000),
            shipping_fee: Money::from_cents(490),
            tax_rate: Rate::from_bps(1900),
        }
    }
}

// =============================================================================
// Output Types
// =============================================================================

/// A cart line enriched with its computed prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedLineItem {
    /// The input line, carried through untouched.
    pub item: CartLineItem,

    /// The per-unit discount applied (for "X% off" badges; zero if none).
    pub discount_rate: Rate,

    /// Base price scaled by the discount, NOT rounded: rounding is
    /// deferred to the line total so sub-cent precision survives
    /// (5.90 × 0.95 = 5.605).
    pub unit_price_after_discount: Money,

    /// `unit_price_after_discount × quantity`, rounded to cents.
    pub line_total: Money,

    /// Savings against the base price for this line, rounded to cents.
    pub line_discount_amount: Money,
}

/// Aggregate totals for a priced cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of rounded line totals, before the weekday discount.
    pub subtotal_before_time_discount: Money,

    /// Whether the weekday discount gate was open for `now`.
    pub time_discount_applied: bool,

    /// Amount subtracted by the weekday discount (zero when inactive).
    pub time_discount_amount: Money,

    /// Subtotal after the weekday discount.
    pub subtotal: Money,

    /// Flat shipping fee from the configuration.
    pub shipping_fee: Money,

    /// VAT on the subtotal (shipping is not taxed).
    pub tax_amount: Money,

    /// `subtotal + shipping_fee + tax_amount`, rounded.
    pub grand_total: Money,

    /// All savings: per-line discounts plus the weekday discount.
    pub total_discount: Money,
}

/// Full result of pricing a cart: enriched lines plus totals.
///
/// Ephemeral by design. Recomputed on every cart view and at checkout,
/// never cached: cart contents and the weekday gate can change between
/// requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedCart {
    pub items: Vec<PricedLineItem>,
    pub totals: CartTotals,
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// The cart pricing engine.
///
/// ## Usage
/// ```rust
/// use bakeshop_core::pricing::{PricingConfig, PricingEngine};
/// use bakeshop_core::cart::CartLineItem;
/// use bakeshop_core::types::ProductKind;
/// use chrono::Utc;
///
/// let engine = PricingEngine::new(PricingConfig::default());
/// let line = CartLineItem::new(
///     "line-1", "prod-1", "Personalized brownie",
///     ProductKind::Standard, 590, 10, None,
/// ).unwrap();
///
/// let priced = engine.price_cart(&[line], Utc::now());
/// // 10+ units → 10% off: unit 5.31, line total 53.10
/// assert_eq!(priced.items[0].line_total.cents(), 5310);
/// ```
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: PricingConfig) -> Self {
        PricingEngine { config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Resolves the per-unit discount rate for a line.
    ///
    /// ## Rules
    /// - Clearance-restock: fixed clearance rate, quantity is irrelevant
    /// - Standard: quantity breaks, inclusive at the lower bound
    ///   (quantity 5 already gets the small tier, 10 the large tier)
    /// - Standard below the small tier: no discount
    pub fn discount_rate(&self, kind: ProductKind, quantity: i64) -> Rate {
        match kind {
            ProductKind::ClearanceRestock => self.config.clearance_rate,
            ProductKind::Standard => {
                if quantity >= self.config.bulk_large_min_qty {
                    self.config.bulk_large_rate
                } else if quantity >= self.config.bulk_small_min_qty {
                    self.config.bulk_small_rate
                } else {
                    Rate::zero()
                }
            }
        }
    }

    /// Prices a single line: discounted unit price, line total, savings.
    ///
    /// Total function, no error conditions; a zero quantity yields a
    /// zero-valued line.
    pub fn price_line_item(&self, item: &CartLineItem) -> PricedLineItem {
        let discount_rate = self.discount_rate(item.kind, item.quantity);

        // Unrounded: the unit price may carry sub-cent precision
        let unit_price_after_discount = item.unit_base_price.less_rate(discount_rate);

        // Rounding happens at the line-total stage
        let line_total = (unit_price_after_discount * item.quantity).round_currency();
        let line_discount_amount = ((item.unit_base_price - unit_price_after_discount)
            * item.quantity)
            .round_currency();

        PricedLineItem {
            item: item.clone(),
            discount_rate,
            unit_price_after_discount,
            line_total,
            line_discount_amount,
        }
    }

    /// Whether the store-wide weekday discount is active on `weekday`.
    pub fn weekday_discount_active(&self, weekday: Weekday) -> bool {
        weekday == self.config.weekday_discount_day
    }

    /// Prices a whole cart snapshot at the injected instant `now`.
    ///
    /// See the module docs for the exact staging and rounding order.
    /// An empty cart yields all-zero totals plus the flat shipping fee;
    /// whether that is checkout-able is the caller's policy.
    pub fn price_cart(&self, line_items: &[CartLineItem], now: DateTime<Utc>) -> PricedCart {
        let items: Vec<PricedLineItem> = line_items
            .iter()
            .map(|item| self.price_line_item(item))
            .collect();

        let mut subtotal_before_time_discount = Money::zero();
        let mut item_discounts = Money::zero();
        for priced in &items {
            subtotal_before_time_discount += priced.line_total;
            item_discounts += priced.line_discount_amount;
        }
        let subtotal_before_time_discount = subtotal_before_time_discount.round_currency();

        let time_discount_applied = self.weekday_discount_active(now.weekday());
        let time_discount_amount = if time_discount_applied {
            subtotal_before_time_discount
                .apply_rate(self.config.weekday_discount_rate)
                .round_currency()
        } else {
            Money::zero()
        };

        let subtotal = (subtotal_before_time_discount - time_discount_amount).round_currency();
        let tax_amount = subtotal.apply_rate(self.config.tax_rate).round_currency();
        let grand_total = (subtotal + self.config.shipping_fee + tax_amount).round_currency();
        let total_discount = (item_discounts + time_discount_amount).round_currency();

        PricedCart {
            items,
            totals: CartTotals {
                subtotal_before_time_discount,
                time_discount_applied,
                time_discount_amount,
                subtotal,
                shipping_fee: self.config.shipping_fee,
                tax_amount,
                grand_total,
                total_discount,
            },
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        PricingEngine::new(PricingConfig::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
