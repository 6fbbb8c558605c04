//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In binary floating point:                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  And integer cents are not enough for this shop either:                 │
//! │    5.90 × 0.95 = 5.605 per unit — the discounted unit price carries     │
//! │    sub-cent precision until the LINE TOTAL is rounded.                  │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Exact base-10 arithmetic, explicit half-up rounding to 2 digits      │
//! │    at each aggregation stage, integer cents only at the DB boundary.    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bakeshop_core::money::Money;
//!
//! // Create from cents (the persistence representation)
//! let price = Money::from_cents(590); // 5.90
//!
//! // Arithmetic operations
//! let doubled = price * 2i64;                   // 11.80
//! let total = price + Money::from_cents(500);   // 10.90
//!
//! // Rounding is explicit, never implicit:
//! assert_eq!((price * 7i64).round_currency().cents(), 4130);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::Rate;

/// Number of fractional currency digits (cents).
pub const CURRENCY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value as an exact decimal amount.
///
/// ## Design Decisions
/// - **Decimal (signed)**: Allows negative values for discounts/adjustments
///   and sub-cent intermediate results (discounted unit prices)
/// - **Single field tuple struct**: Zero-cost abstraction over `Decimal`
/// - **Explicit rounding**: `round_currency()` applies half-up rounding at
///   currency precision; nothing rounds behind your back
///
/// ## Where Money is Used
/// ```text
/// Product.base_price_cents ──► CartLineItem.unit_base_price
///                                   │
///                                   ▼ (discount resolver, unrounded)
///                       unit_price_after_discount
///                                   │
///                                   ▼ (× quantity, then round)
///                       line_total ──► subtotal ──► tax ──► grand total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bakeshop_core::money::Money;
    ///
    /// let price = Money::from_cents(590); // Represents 5.90
    /// assert_eq!(price.cents(), 590);
    /// ```
    ///
    /// ## Why Cents?
    /// The database stores every monetary column as integer cents. This
    /// constructor is the boundary between storage and calculation.
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_SCALE))
    }

    /// Creates a Money value from major and minor units (euros and cents).
    ///
    /// ## Example
    /// ```rust
    /// use bakeshop_core::money::Money;
    ///
    /// let price = Money::from_major_minor(5, 90); // 5.90
    /// assert_eq!(price.cents(), 590);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money::from_cents(major * 100 - minor)
        } else {
            Money::from_cents(major * 100 + minor)
        }
    }

    /// Wraps a raw decimal amount.
    ///
    /// Used by the pricing engine for intermediate, possibly sub-cent
    /// values. Persisted amounts must go through `round_currency()` first.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the underlying decimal amount (possibly sub-cent).
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Rounds to currency precision (2 fractional digits, half-up).
    ///
    /// ## Half-Up Rounding
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  13.275 → 13.28     39.235 → 39.24     5.252 → 5.25                │
    /// │                                                                     │
    /// │  Midpoints round away from zero ("kaufmännisches Runden"), the     │
    /// │  rule customers and the order ledger expect.  Applied after EACH   │
    /// │  aggregation stage, not only at display time, so re-invoking the   │
    /// │  engine on its own output never drifts by more than one cent.      │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    #[inline]
    pub fn round_currency(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Returns the value in whole cents, rounding half-up first.
    ///
    /// ## Example
    /// ```rust
    /// use bakeshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(590).cents(), 590);
    /// ```
    #[inline]
    pub fn cents(&self) -> i64 {
        (self.round_currency().0 * Decimal::ONE_HUNDRED)
            .to_i64()
            .unwrap_or_default()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies by a fractional rate, without rounding.
    ///
    /// Used for every percentage in the system: discount tiers, the
    /// weekday discount and tax.
    ///
    /// ## Example
    /// ```rust
    /// use bakeshop_core::money::Money;
    /// use bakeshop_core::types::Rate;
    ///
    /// let subtotal = Money::from_cents(5252);   // 52.52
    /// let tax = subtotal.apply_rate(Rate::from_bps(1900)); // 19%
    /// assert_eq!(tax.round_currency().cents(), 998); // 9.9788 → 9.98
    /// ```
    #[inline]
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(self.0 * rate.as_decimal())
    }

    /// Reduces the value by a fractional rate, without rounding.
    ///
    /// `price.less_rate(5%)` is the discounted price, `price × 0.95`.
    /// The result keeps full precision; rounding is deferred to the
    /// line-total stage.
    #[inline]
    pub fn less_rate(&self, rate: Rate) -> Money {
        Money(self.0 * (Decimal::ONE - rate.as_decimal()))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging, rounded to cents. Locale display
/// (decimal comma, currency symbol placement) is a presentation concern
/// handled by the rendering surface.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.cents();
        let sign = if cents < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02} €", sign, (cents / 100).abs(), (cents % 100).abs())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

/// Multiplication by i32.
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(590);
        assert_eq!(money.cents(), 590);
        assert_eq!(money.amount(), Decimal::new(590, 2));
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(5, 90);
        assert_eq!(money.cents(), 590);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(590)), "5.90 €");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00 €");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50 €");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00 €");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3i64;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_round_currency_half_up() {
        // 39.235 → 39.24 and 13.275 → 13.28 (midpoints go up)
        let a = Money::from_decimal(Decimal::new(39235, 3));
        assert_eq!(a.round_currency().cents(), 3924);

        let b = Money::from_decimal(Decimal::new(13275, 3));
        assert_eq!(b.round_currency().cents(), 1328);

        // Negative midpoints round away from zero
        let c = Money::from_decimal(Decimal::new(-13275, 3));
        assert_eq!(c.round_currency().cents(), -1328);
    }

    #[test]
    fn test_rounding_is_stable() {
        // Re-rounding an already-rounded value must not change it
        let m = Money::from_decimal(Decimal::new(39235, 3)).round_currency();
        assert_eq!(m, m.round_currency());
        assert_eq!(m, m.round_currency().round_currency());
    }

    #[test]
    fn test_apply_rate_unrounded() {
        // 5.90 at 5% keeps sub-cent precision: 0.295
        let base = Money::from_cents(590);
        let discount = base.apply_rate(Rate::from_bps(500));
        assert_eq!(discount.amount(), Decimal::new(295, 3));
    }

    #[test]
    fn test_less_rate_unrounded() {
        // 5.90 × 0.95 = 5.605, not representable in cents
        let base = Money::from_cents(590);
        let discounted = base.less_rate(Rate::from_bps(500));
        assert_eq!(discounted.amount(), Decimal::new(5605, 3));

        // × 0.90 happens to be exact
        let discounted = base.less_rate(Rate::from_bps(1000));
        assert_eq!(discounted.cents(), 531);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_cents(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }
}
