mod apit_bracket;
mod apit_scenario;
mod employee;
mod pay_period;
mod payroll_record;
mod payroll_result;
mod tax_rate_config;
mod tax_rate_set;
mod tax_type;

pub use apit_bracket::ApitBracket;
pub use apit_scenario::ApitScenario;
pub use employee::{Employee, EmployeeSalaryInput, NewEmployee};
pub use pay_period::{PayPeriod, PayPeriodError};
pub use payroll_record::{NewPayrollRecord, PayrollRecord, PayrollStatus};
pub use payroll_result::PayrollComputationResult;
pub use tax_rate_config::{NewTaxRateConfig, TaxRateConfig};
pub use tax_rate_set::TaxRateSet;
pub use tax_type::TaxType;
