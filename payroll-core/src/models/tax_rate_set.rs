use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApitBracket;
use crate::rates::defaults;

/// The statutory rates in force for one calculation.
///
/// Resolved fresh from configuration for each calculation date and never
/// mutated by the calculator. Percentages are expressed as `8` for 8%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateSet {
    pub epf_employee_rate: Decimal,
    pub epf_employer_rate: Decimal,
    pub etf_rate: Decimal,
    pub stamp_fee: Decimal,
    pub apit_brackets: Vec<ApitBracket>,
}

impl Default for TaxRateSet {
    /// Sri Lanka statutory defaults, used when no configuration is active.
    fn default() -> Self {
        Self {
            epf_employee_rate: defaults::EPF_EMPLOYEE_RATE,
            epf_employer_rate: defaults::EPF_EMPLOYER_RATE,
            etf_rate: defaults::ETF_RATE,
            stamp_fee: defaults::STAMP_FEE,
            apit_brackets: defaults::apit_brackets(),
        }
    }
}
