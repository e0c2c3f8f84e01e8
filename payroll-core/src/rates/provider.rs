use chrono::NaiveDate;
use tracing::warn;

use super::resolver::resolve_active_rates;
use crate::{PayrollRepository, TaxRateSet};

/// Resolves the active [`TaxRateSet`] from a repository.
///
/// Payroll must stay computable when configuration is unavailable, so a
/// repository failure is logged and answered with the statutory defaults.
pub struct RateProvider<'a> {
    repo: &'a dyn PayrollRepository,
}

impl<'a> RateProvider<'a> {
    pub fn new(repo: &'a dyn PayrollRepository) -> Self {
        Self { repo }
    }

    /// Rates in force on `as_of`.
    pub async fn active_rates(
        &self,
        as_of: NaiveDate,
    ) -> TaxRateSet {
        match self.repo.list_tax_rate_configs().await {
            Ok(configs) => resolve_active_rates(&configs, as_of),
            Err(error) => {
                warn!(%error, %as_of, "failed to load tax rate configuration, using defaults");
                TaxRateSet::default()
            }
        }
    }
}
