//! The three payroll entry points: single calculation, run preview and run
//! generation.
//!
//! Each resolves rates through [`RateProvider`] and computes through the
//! same calculator, so the three never drift apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::compute_payroll;
use crate::payroll_run::{PayrollRunPreview, build_run};
use crate::rates::RateProvider;
use crate::{
    ApitScenario, EmployeeSalaryInput, NewPayrollRecord, PayPeriod, PayrollComputationResult,
    PayrollRecord, PayrollRepository, PayrollStatus, RepositoryError, TaxRateSet,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayrollServiceError {
    #[error("a payroll run for {0} already exists")]
    RunAlreadyExists(PayPeriod),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of persisting a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRun {
    pub preview: PayrollRunPreview,
    pub records: Vec<PayrollRecord>,
}

pub struct PayrollService<'a> {
    repo: &'a dyn PayrollRepository,
}

impl<'a> PayrollService<'a> {
    pub fn new(repo: &'a dyn PayrollRepository) -> Self {
        Self { repo }
    }

    /// Rates in force on `as_of`, with defaults for anything unconfigured.
    pub async fn rates(
        &self,
        as_of: NaiveDate,
    ) -> TaxRateSet {
        RateProvider::new(self.repo).active_rates(as_of).await
    }

    /// Ad-hoc calculation for arbitrary salary inputs. Nothing is persisted.
    pub async fn calculate(
        &self,
        input: &EmployeeSalaryInput,
        as_of: NaiveDate,
    ) -> PayrollComputationResult {
        let rates = self.rates(as_of).await;
        compute_payroll(input, &rates)
    }

    /// Calculation for a stored employee, optionally forcing a scenario.
    pub async fn calculate_for_employee(
        &self,
        employee_id: i64,
        as_of: NaiveDate,
        scenario_override: Option<ApitScenario>,
    ) -> Result<PayrollComputationResult, PayrollServiceError> {
        let employee = self.repo.get_employee(employee_id).await?;
        let mut input = employee.salary_input();
        if let Some(scenario) = scenario_override {
            input.apit_scenario = scenario;
        }
        Ok(self.calculate(&input, as_of).await)
    }

    /// Computes the run for `period` over all active employees without
    /// persisting anything.
    pub async fn preview_run(
        &self,
        period: PayPeriod,
        as_of: NaiveDate,
        scenario_override: Option<ApitScenario>,
    ) -> Result<PayrollRunPreview, PayrollServiceError> {
        let employees = self.repo.list_employees(true).await?;
        let rates = self.rates(as_of).await;

        let preview = build_run(period, &employees, &rates, scenario_override);
        debug!(%period, headcount = preview.totals.headcount, "computed payroll run preview");
        Ok(preview)
    }

    /// Computes the run for `period` and stores one draft record per
    /// employee.
    ///
    /// # Errors
    ///
    /// * [`PayrollServiceError::RunAlreadyExists`] if `period` already has
    ///   payroll records.
    /// * Any repository error. The records are written as one batch, so a
    ///   failed run leaves the period empty and can be retried.
    pub async fn generate_run(
        &self,
        period: PayPeriod,
        as_of: NaiveDate,
        scenario_override: Option<ApitScenario>,
    ) -> Result<GeneratedRun, PayrollServiceError> {
        if self.repo.count_payroll_records(period).await? > 0 {
            return Err(PayrollServiceError::RunAlreadyExists(period));
        }

        let preview = self.preview_run(period, as_of, scenario_override).await?;

        let batch = preview
            .lines
            .iter()
            .map(|line| NewPayrollRecord {
                employee_id: line.employee_id,
                period,
                result: line.result.clone(),
                status: PayrollStatus::Draft,
            })
            .collect();
        let records = self.repo.create_payroll_records(batch).await?;

        info!(
            %period,
            records = records.len(),
            total_ctc = %preview.totals.total_ctc,
            "generated payroll run"
        );
        Ok(GeneratedRun { preview, records })
    }
}
