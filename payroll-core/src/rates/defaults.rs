//! Sri Lanka statutory defaults, used whenever no active configuration
//! covers a tax type.

use rust_decimal::Decimal;

use crate::ApitBracket;

pub const EPF_EMPLOYEE_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 0);
pub const EPF_EMPLOYER_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 0);
pub const ETF_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 0);
pub const STAMP_FEE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// `(min_income, max_income, rate %)`; `0` as max marks the open top bracket.
const APIT_TABLE: [(i64, i64, i64); 7] = [
    (0, 100_000, 0),
    (100_001, 141_667, 6),
    (141_668, 183_333, 12),
    (183_334, 225_000, 18),
    (225_001, 266_667, 24),
    (266_668, 308_333, 30),
    (308_334, 0, 36),
];

/// The default monthly APIT bracket table.
pub fn apit_brackets() -> Vec<ApitBracket> {
    APIT_TABLE
        .iter()
        .map(|&(min, max, rate)| {
            ApitBracket::new(
                Decimal::from(min),
                (max > 0).then(|| Decimal::from(max)),
                Decimal::from(rate),
            )
        })
        .collect()
}
