//! In-memory [`PayrollRepository`] for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    Employee, NewEmployee, NewPayrollRecord, NewTaxRateConfig, PayPeriod, PayrollRecord,
    PayrollRepository, RepositoryError, TaxRateConfig,
};

#[derive(Default)]
struct State {
    configs: Vec<TaxRateConfig>,
    employees: Vec<Employee>,
    records: Vec<PayrollRecord>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
    fail_rate_lookups: bool,
    fail_record_write_at: Option<usize>,
}

impl InMemoryRepository {
    /// A repository whose rate-configuration lookups always fail.
    pub fn failing_rate_lookups() -> Self {
        Self {
            fail_rate_lookups: true,
            ..Self::default()
        }
    }

    /// A repository that fails while writing the `n`th record (zero based)
    /// of a batch, as a dropped connection would.
    pub fn failing_record_write_at(n: usize) -> Self {
        Self {
            fail_record_write_at: Some(n),
            ..Self::default()
        }
    }

    /// Clears any injected record-write failure.
    pub fn recover(&mut self) {
        self.fail_record_write_at = None;
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl PayrollRepository for InMemoryRepository {
    async fn list_tax_rate_configs(&self) -> Result<Vec<TaxRateConfig>, RepositoryError> {
        if self.fail_rate_lookups {
            return Err(RepositoryError::Connection("database unavailable".to_string()));
        }
        Ok(self.state.lock().unwrap().configs.clone())
    }

    async fn insert_tax_rate_config(
        &self,
        config: NewTaxRateConfig,
    ) -> Result<TaxRateConfig, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let stored = TaxRateConfig {
            id: next_id(state.configs.len()),
            tax_type: config.tax_type,
            rate: config.rate,
            brackets: config.brackets,
            applicable_from: config.applicable_from,
            applicable_to: config.applicable_to,
            is_active: config.is_active,
            description: config.description,
        };
        state.configs.push(stored.clone());
        Ok(stored)
    }

    async fn deactivate_tax_rate_config(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let config = state
            .configs
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        config.is_active = false;
        Ok(())
    }

    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let stored = Employee {
            id: next_id(state.employees.len()),
            employee_number: employee.employee_number,
            full_name: employee.full_name,
            basic_salary: employee.basic_salary,
            performance_salary: employee.performance_salary,
            transport_allowance: employee.transport_allowance,
            other_allowances: employee.other_allowances,
            apit_scenario: employee.apit_scenario,
            epf_employee_rate: employee.epf_employee_rate,
            epf_employer_rate: employee.epf_employer_rate,
            etf_rate: employee.etf_rate,
            is_active: employee.is_active,
        };
        state.employees.push(stored.clone());
        Ok(stored)
    }

    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, RepositoryError> {
        self.state
            .lock()
            .unwrap()
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_employees(
        &self,
        active_only: bool,
    ) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .employees
            .iter()
            .filter(|e| !active_only || e.is_active)
            .cloned()
            .collect())
    }

    async fn create_payroll_records(
        &self,
        records: Vec<NewPayrollRecord>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError> {
        let mut state = self.state.lock().unwrap();
        let mut staged: Vec<PayrollRecord> = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            if self.fail_record_write_at == Some(index) {
                return Err(RepositoryError::Database("disk I/O error".to_string()));
            }
            let duplicate = state
                .records
                .iter()
                .chain(&staged)
                .any(|r| r.employee_id == record.employee_id && r.period == record.period);
            if duplicate {
                return Err(RepositoryError::Database(
                    "UNIQUE constraint failed: payroll_record".to_string(),
                ));
            }
            staged.push(PayrollRecord {
                id: next_id(state.records.len() + staged.len()),
                employee_id: record.employee_id,
                period: record.period,
                result: record.result,
                status: record.status,
                created_at: Utc::now(),
            });
        }
        state.records.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn list_payroll_records(
        &self,
        period: Option<PayPeriod>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .records
            .iter()
            .filter(|r| period.is_none_or(|p| r.period == p))
            .cloned()
            .collect())
    }

    async fn count_payroll_records(
        &self,
        period: PayPeriod,
    ) -> Result<i64, RepositoryError> {
        let state = self.state.lock().unwrap();
        Ok(state.records.iter().filter(|r| r.period == period).count() as i64)
    }
}
