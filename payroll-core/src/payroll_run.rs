//! Multi-employee payroll runs.
//!
//! [`build_run`] is the one place a run is computed; both the preview and
//! the generate paths of [`PayrollService`](crate::PayrollService) call it,
//! and it calls [`PayrollCalculator`] per employee, so a previewed run and
//! the records later generated from it carry identical figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::PayrollCalculator;
use crate::{ApitScenario, Employee, PayPeriod, PayrollComputationResult, TaxRateSet};

/// One employee's row in a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollLine {
    pub employee_id: i64,
    pub employee_number: String,
    pub full_name: String,
    #[serde(flatten)]
    pub result: PayrollComputationResult,
}

/// Column sums over every line of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTotals {
    pub headcount: usize,
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

impl PayrollTotals {
    pub fn add(
        &mut self,
        result: &PayrollComputationResult,
    ) {
        self.headcount += 1;
        self.gross_salary += result.gross_salary;
        self.epf_employee += result.epf_employee;
        self.epf_employer += result.epf_employer;
        self.etf += result.etf;
        self.apit += result.apit;
        self.apit_employer += result.apit_employer;
        self.stamp_fee += result.stamp_fee;
        self.total_deductions += result.total_deductions;
        self.net_salary += result.net_salary;
        self.total_ctc += result.total_ctc;
    }
}

/// A computed, not yet persisted, payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRunPreview {
    pub period: PayPeriod,
    pub rates: TaxRateSet,
    pub lines: Vec<PayrollLine>,
    pub totals: PayrollTotals,
}

/// Computes a payroll run for `period` over the active `employees`.
///
/// Inactive employees are skipped. When `scenario_override` is set it
/// replaces every employee's own APIT scenario for this run.
pub fn build_run(
    period: PayPeriod,
    employees: &[Employee],
    rates: &TaxRateSet,
    scenario_override: Option<ApitScenario>,
) -> PayrollRunPreview {
    let calculator = PayrollCalculator::new(rates);
    let mut totals = PayrollTotals::default();

    let lines: Vec<PayrollLine> = employees
        .iter()
        .filter(|e| e.is_active)
        .map(|employee| {
            let mut input = employee.salary_input();
            if let Some(scenario) = scenario_override {
                input.apit_scenario = scenario;
            }
            let result = calculator.calculate(&input);
            totals.add(&result);
            PayrollLine {
                employee_id: employee.id,
                employee_number: employee.employee_number.clone(),
                full_name: employee.full_name.clone(),
                result,
            }
        })
        .collect();

    PayrollRunPreview {
        period,
        rates: rates.clone(),
        lines,
        totals,
    }
}
