//! Advance Personal Income Tax (APIT) withholding.
//!
//! APIT is a progressive marginal tax on monthly gross salary. Each bracket
//! taxes the slice of income that falls inside it:
//!
//! ```text
//! slice = min(gross, max_income ?? gross) - min_income + 1
//! apit  = round2( Σ slice × rate / 100 )
//! ```
//!
//! The `+ 1` treats every bracket as including its lower boundary. Payroll
//! figures already issued were computed this way, so it is reproduced
//! exactly; see the `one_unit_offset_*` tests.

use rust_decimal::Decimal;

use crate::ApitBracket;
use crate::calculations::common::{ONE_HUNDRED, round_half_up};

/// Computes APIT for `gross_salary` against an ascending bracket table.
///
/// Brackets are walked in order until one starts at or above the gross
/// salary. The total is rounded once at the end, never per bracket.
/// Gross salary inside the lowest bracket (or zero or negative) yields zero
/// with any table whose first bracket is 0%.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::calculate_apit;
/// use payroll_core::rates::defaults;
///
/// let brackets = defaults::apit_brackets();
///
/// assert_eq!(calculate_apit(dec!(100000), &brackets), dec!(0.00));
/// assert_eq!(calculate_apit(dec!(220000), &brackets), dec!(14100.00));
/// ```
pub fn calculate_apit(
    gross_salary: Decimal,
    brackets: &[ApitBracket],
) -> Decimal {
    let mut total = Decimal::ZERO;

    for bracket in brackets {
        if gross_salary <= bracket.min_income {
            break;
        }

        let upper = bracket
            .max_income
            .map_or(gross_salary, |max| gross_salary.min(max));
        let slice = upper - bracket.min_income + Decimal::ONE;

        total += slice * bracket.rate / ONE_HUNDRED;
    }

    round_half_up(total)
}
