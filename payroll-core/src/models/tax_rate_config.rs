use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApitBracket, TaxType};

/// A stored rate-configuration entry with its effective window.
///
/// For `stamp_fee` the `rate` is a fixed currency amount; for every other
/// type it is a percentage. Only `apit` entries carry brackets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRateConfig {
    pub id: i64,
    pub tax_type: TaxType,
    pub rate: Decimal,
    pub brackets: Vec<ApitBracket>,
    pub applicable_from: NaiveDate,
    pub applicable_to: Option<NaiveDate>,
    pub is_active: bool,
    pub description: Option<String>,
}

impl TaxRateConfig {
    /// True when the entry is active and `date` falls inside
    /// `[applicable_from, applicable_to]` (both ends inclusive).
    pub fn is_effective_on(
        &self,
        date: NaiveDate,
    ) -> bool {
        self.is_active
            && self.applicable_from <= date
            && self.applicable_to.is_none_or(|to| to >= date)
    }
}

/// For creating new configuration entries (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaxRateConfig {
    pub tax_type: TaxType,
    pub rate: Decimal,
    pub brackets: Vec<ApitBracket>,
    pub applicable_from: NaiveDate,
    pub applicable_to: Option<NaiveDate>,
    pub is_active: bool,
    pub description: Option<String>,
}
