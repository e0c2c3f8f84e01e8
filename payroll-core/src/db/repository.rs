use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Employee, NewEmployee, NewPayrollRecord, NewTaxRateConfig, PayPeriod, PayrollRecord,
    TaxRateConfig,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[async_trait]
pub trait PayrollRepository: Send + Sync {
    // Tax rate configuration
    async fn list_tax_rate_configs(&self) -> Result<Vec<TaxRateConfig>, RepositoryError>;

    async fn insert_tax_rate_config(
        &self,
        config: NewTaxRateConfig,
    ) -> Result<TaxRateConfig, RepositoryError>;

    async fn deactivate_tax_rate_config(&self, id: i64) -> Result<(), RepositoryError>;

    // Employees
    async fn create_employee(&self, employee: NewEmployee) -> Result<Employee, RepositoryError>;

    async fn get_employee(&self, id: i64) -> Result<Employee, RepositoryError>;

    async fn list_employees(&self, active_only: bool) -> Result<Vec<Employee>, RepositoryError>;

    // Payroll records

    /// Stores every record or none of them.
    async fn create_payroll_records(
        &self,
        records: Vec<NewPayrollRecord>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError>;

    async fn list_payroll_records(
        &self,
        period: Option<PayPeriod>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError>;

    async fn count_payroll_records(&self, period: PayPeriod) -> Result<i64, RepositoryError>;
}
