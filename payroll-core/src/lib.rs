//! Payroll and statutory tax computation.
//!
//! Resolves the EPF/ETF/stamp-fee/APIT rates in force on a date and turns an
//! employee's salary inputs into a deterministic payslip breakdown.

pub mod calculations;
pub mod db;
pub mod models;
pub mod payroll_run;
pub mod rates;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use db::repository::{PayrollRepository, RepositoryError};
pub use models::*;
pub use payroll_run::{PayrollLine, PayrollRunPreview, PayrollTotals, build_run};
pub use service::{GeneratedRun, PayrollService, PayrollServiceError};
