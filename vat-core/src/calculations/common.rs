//! Rounding helpers shared by the regime calculator and input parsing.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places, sending values at
/// exactly 0.005 away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use vat_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(40.650406)), dec!(40.65));
/// assert_eq!(round_half_up(dec!(9.345)), dec!(9.35));
/// assert_eq!(round_half_up(dec!(-9.345)), dec!(-9.35));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a decimal value to exactly two decimal places, sending values at
/// exactly 0.005 to the nearest even cent (banker's rounding).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use vat_core::calculations::common::round_half_even;
///
/// assert_eq!(round_half_even(dec!(9.345)), dec!(9.34));
/// assert_eq!(round_half_even(dec!(9.355)), dec!(9.36));
/// ```
pub fn round_half_even(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointNearestEven)
}
