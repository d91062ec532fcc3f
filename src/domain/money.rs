//! Monetary types for price and quantity representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Quantity (number of shares) represented as a Decimal for precision.
pub type Quantity = Decimal;

/// Convert a basis-point figure to a fractional rate (bps / 10,000).
#[must_use]
pub fn bps_to_rate(bps: Decimal) -> Decimal {
    bps / Decimal::from(10_000)
}
