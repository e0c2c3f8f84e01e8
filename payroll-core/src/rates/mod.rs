//! Tax rate resolution.
//!
//! Turns stored rate-configuration entries into the single [`TaxRateSet`]
//! in force on a given date, falling back to statutory defaults.
//!
//! [`TaxRateSet`]: crate::TaxRateSet

pub mod defaults;
mod provider;
mod resolver;
mod validation;

pub use provider::RateProvider;
pub use resolver::{resolve_active_rates, select_active};
pub use validation::{BracketTableError, validate_brackets};
