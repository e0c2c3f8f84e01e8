use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApitScenario;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub employee_number: String,
    pub full_name: String,

    // Monthly pay components
    pub basic_salary: Decimal,
    pub performance_salary: Decimal,
    pub transport_allowance: Decimal,
    pub other_allowances: Decimal,

    pub apit_scenario: ApitScenario,

    // Per-employee statutory overrides
    pub epf_employee_rate: Option<Decimal>,
    pub epf_employer_rate: Option<Decimal>,
    pub etf_rate: Option<Decimal>,

    pub is_active: bool,
}

impl Employee {
    /// Sum of every allowance-like component added to basic salary.
    pub fn total_allowances(&self) -> Decimal {
        self.performance_salary + self.transport_allowance + self.other_allowances
    }

    /// Salary inputs for the payroll calculator, using the employee's own
    /// APIT scenario.
    pub fn salary_input(&self) -> EmployeeSalaryInput {
        EmployeeSalaryInput {
            basic_salary: self.basic_salary,
            allowances: self.total_allowances(),
            apit_scenario: self.apit_scenario,
            epf_employee_rate: self.epf_employee_rate,
            epf_employer_rate: self.epf_employer_rate,
            etf_rate: self.etf_rate,
        }
    }
}

/// For creating new employees (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub employee_number: String,
    pub full_name: String,
    pub basic_salary: Decimal,
    pub performance_salary: Decimal,
    pub transport_allowance: Decimal,
    pub other_allowances: Decimal,
    pub apit_scenario: ApitScenario,
    pub epf_employee_rate: Option<Decimal>,
    pub epf_employer_rate: Option<Decimal>,
    pub etf_rate: Option<Decimal>,
    pub is_active: bool,
}

/// Calculator input for a single employee.
///
/// The optional rates override the resolved [`TaxRateSet`](super::TaxRateSet)
/// for this employee only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSalaryInput {
    pub basic_salary: Decimal,
    #[serde(default)]
    pub allowances: Decimal,
    #[serde(default)]
    pub apit_scenario: ApitScenario,
    #[serde(default)]
    pub epf_employee_rate: Option<Decimal>,
    #[serde(default)]
    pub epf_employer_rate: Option<Decimal>,
    #[serde(default)]
    pub etf_rate: Option<Decimal>,
}

impl EmployeeSalaryInput {
    /// Input with no per-employee overrides.
    pub fn new(
        basic_salary: Decimal,
        allowances: Decimal,
        apit_scenario: ApitScenario,
    ) -> Self {
        Self {
            basic_salary,
            allowances,
            apit_scenario,
            epf_employee_rate: None,
            epf_employer_rate: None,
            etf_rate: None,
        }
    }
}
