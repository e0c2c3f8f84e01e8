//! CSV loaders for tax-rate configuration and employee master data.

mod employees;
mod fields;
mod rates;

pub use employees::{EmployeeLoader, EmployeeLoaderError};
pub use rates::{TaxRateLoader, TaxRateLoaderError};
