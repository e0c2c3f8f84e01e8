use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One slice of the progressive APIT table.
///
/// `rate` is a percentage (`6` means 6%). `max_income` of `None` marks the
/// open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApitBracket {
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub rate: Decimal,
}

impl ApitBracket {
    pub fn new(
        min_income: Decimal,
        max_income: Option<Decimal>,
        rate: Decimal,
    ) -> Self {
        Self {
            min_income,
            max_income,
            rate,
        }
    }
}
