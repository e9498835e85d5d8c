//! Monetary rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every monetary figure.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to two decimal places, half away from zero.
///
/// Every concept value and every sub-total passes through here at the point
/// it is computed, so persisted figures and previewed figures agree exactly.
///
/// # Example
///
/// ```
/// use payroll_engine::models::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("2.345").unwrap()), Decimal::from_str("2.35").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-2.345").unwrap()), Decimal::from_str("-2.35").unwrap());
/// assert_eq!(round_money(Decimal::from(100)).to_string(), "100.00");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}
