use std::collections::HashSet;
use std::io::Read;

use payroll_core::{ApitScenario, NewEmployee, PayrollRepository, RepositoryError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::fields::{
    active_flag, amount, decimal_or_zero, default_true, optional_decimal, optional_string,
};

/// Errors that can occur when loading employees.
#[derive(Debug, Error)]
pub enum EmployeeLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("line {line}: unknown APIT scenario '{value}' (expected 'employee' or 'employer')")]
    UnknownScenario { line: u64, value: String },

    #[error("line {line}: employee number '{employee_number}' appears more than once")]
    DuplicateEmployeeNumber { line: u64, employee_number: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for EmployeeLoaderError {
    fn from(err: csv::Error) -> Self {
        EmployeeLoaderError::CsvParse(err.to_string())
    }
}

/// One row of the employees CSV. Allowance columns may be omitted or left
/// empty; the rate override columns are empty unless the employee has a
/// contract-specific rate.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct EmployeeRecord {
    employee_number: String,
    full_name: String,
    #[serde(deserialize_with = "amount")]
    basic_salary: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    performance_salary: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    transport_allowance: Decimal,
    #[serde(default, deserialize_with = "decimal_or_zero")]
    other_allowances: Decimal,
    #[serde(default, deserialize_with = "optional_string")]
    apit_scenario: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal")]
    epf_employee_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_decimal")]
    epf_employer_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_decimal")]
    etf_rate: Option<Decimal>,
    #[serde(default = "default_true", deserialize_with = "active_flag")]
    is_active: bool,
}

/// Loader for employee master data from CSV files.
pub struct EmployeeLoader;

impl EmployeeLoader {
    /// Parse employees from a CSV reader.
    ///
    /// An empty `apit_scenario` means [`ApitScenario::Employee`]; any other
    /// value than `employee`/`employer` is rejected with its line number.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<NewEmployee>, EmployeeLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut seen = HashSet::new();
        let mut employees = Vec::new();

        for result in csv_reader.records() {
            let row = result?;
            let line = row.position().map_or(0, |p| p.line());
            let record: EmployeeRecord = row.deserialize(Some(&headers))?;

            let apit_scenario = match record.apit_scenario.as_deref() {
                None => ApitScenario::default(),
                Some(value) => ApitScenario::parse(&value.to_ascii_lowercase()).ok_or_else(|| {
                    EmployeeLoaderError::UnknownScenario {
                        line,
                        value: value.to_string(),
                    }
                })?,
            };

            let employee_number = record.employee_number.trim().to_string();
            if !seen.insert(employee_number.clone()) {
                return Err(EmployeeLoaderError::DuplicateEmployeeNumber {
                    line,
                    employee_number,
                });
            }

            employees.push(NewEmployee {
                employee_number,
                full_name: record.full_name.trim().to_string(),
                basic_salary: record.basic_salary,
                performance_salary: record.performance_salary,
                transport_allowance: record.transport_allowance,
                other_allowances: record.other_allowances,
                apit_scenario,
                epf_employee_rate: record.epf_employee_rate,
                epf_employer_rate: record.epf_employer_rate,
                etf_rate: record.etf_rate,
                is_active: record.is_active,
            });
        }

        Ok(employees)
    }

    /// Create employees through the repository, skipping employee numbers
    /// that already exist. Returns the number created.
    pub async fn load(
        repo: &dyn PayrollRepository,
        employees: &[NewEmployee],
    ) -> Result<usize, EmployeeLoaderError> {
        let existing: HashSet<String> = repo
            .list_employees(false)
            .await?
            .into_iter()
            .map(|e| e.employee_number)
            .collect();

        let mut created = 0;
        for employee in employees {
            if existing.contains(&employee.employee_number) {
                debug!(employee_number = %employee.employee_number, "employee already exists, skipping");
                continue;
            }
            repo.create_employee(employee.clone()).await?;
            created += 1;
        }

        Ok(created)
    }
}
