//! Common utility functions for payroll calculations.
//!
//! This module provides shared functionality used by the APIT and payroll
//! calculators, chiefly the currency rounding rule.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, for converting percentages to fractions.
pub(crate) const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest magnitude input layers accept for an amount or a rate (10^12).
///
/// The calculator does not check its inputs. Anything read from a user or a
/// file is held to this bound first, which keeps every sum and product the
/// calculator forms inside `Decimal`'s range.
pub const MAX_INPUT_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero. The result always
/// carries a scale of two, so `8000` comes back as `8000.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// assert_eq!(round_half_up(dec!(8000)).to_string(), "8000.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Applies a percentage rate to an amount and rounds the result.
///
/// `rate` is a percentage, so `percent_of(dec!(100000), dec!(8))` is `8000.00`.
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Decimal {
    round_half_up(amount * rate / ONE_HUNDRED)
}
