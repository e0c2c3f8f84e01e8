//! Payroll calculation modules.
//!
//! Pure, side-effect-free functions: the APIT bracket walk and the per-employee
//! salary breakdown built on top of it.

pub mod apit;
pub mod common;
pub mod payroll;

pub use apit::calculate_apit;
pub use common::MAX_INPUT_AMOUNT;
pub use payroll::{EffectiveRates, PayrollCalculator, compute_payroll, effective_rates};
