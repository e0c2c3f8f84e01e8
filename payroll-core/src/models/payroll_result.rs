use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApitScenario;

/// Salary breakdown produced by the payroll calculator.
///
/// Serialized field names (`grossSalary`, `epfEmployee`, `totalCTC`, ...)
/// are consumed as-is by reporting and export code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollComputationResult {
    // Echoed inputs
    pub basic_salary: Decimal,
    pub allowances: Decimal,
    pub apit_scenario: ApitScenario,

    pub gross_salary: Decimal,
    pub epf_employee: Decimal,
    pub epf_employer: Decimal,
    pub etf: Decimal,
    pub apit: Decimal,
    pub apit_employer: Decimal,
    pub stamp_fee: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    #[serde(rename = "totalCTC")]
    pub total_ctc: Decimal,
}
