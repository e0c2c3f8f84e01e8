use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Read;

use chrono::NaiveDate;
use payroll_core::rates::{BracketTableError, validate_brackets};
use payroll_core::{
    ApitBracket, NewTaxRateConfig, PayrollRepository, RepositoryError, TaxRateConfig, TaxType,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::fields::{
    active_flag, amount, default_true, optional_date, optional_decimal, optional_string,
};

/// Errors that can occur when loading tax rate configuration.
#[derive(Debug, Error)]
pub enum TaxRateLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("line {line}: unknown tax type '{value}'")]
    UnknownTaxType { line: u64, value: String },

    #[error("line {line}: APIT rows need a min_income")]
    MissingMinIncome { line: u64 },

    #[error(
        "line {line}: APIT row effective {applicable_from} disagrees with the table's \
         applicable_to or is_active"
    )]
    ConflictingApitRow { line: u64, applicable_from: NaiveDate },

    #[error("APIT table effective {applicable_from} is invalid: {source}")]
    InvalidBrackets {
        applicable_from: NaiveDate,
        #[source]
        source: BracketTableError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for TaxRateLoaderError {
    fn from(err: csv::Error) -> Self {
        TaxRateLoaderError::CsvParse(err.to_string())
    }
}

/// One row of the tax rates CSV.
///
/// Flat-rate types use `rate` alone. Each `apit` row is one bracket: `rate`
/// is the bracket's marginal percentage and `min_income`/`max_income` its
/// bounds (empty `max_income` for the open-ended top bracket).
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct TaxRateRecord {
    tax_type: String,
    #[serde(deserialize_with = "amount")]
    rate: Decimal,
    applicable_from: NaiveDate,
    #[serde(default, deserialize_with = "optional_date")]
    applicable_to: Option<NaiveDate>,
    #[serde(default = "default_true", deserialize_with = "active_flag")]
    is_active: bool,
    #[serde(default, deserialize_with = "optional_decimal")]
    min_income: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_decimal")]
    max_income: Option<Decimal>,
    #[serde(default, deserialize_with = "optional_string")]
    description: Option<String>,
}

/// Loader for tax rate configuration from CSV files.
///
/// APIT rows sharing an `applicable_from` date form one bracket table; every
/// other row becomes its own flat-rate configuration. Rows of one table must
/// agree on `applicable_to` and `is_active`. The first non-empty description
/// names the table.
pub struct TaxRateLoader;

impl TaxRateLoader {
    /// Parse configurations from a CSV reader.
    ///
    /// Flat-rate configurations come first in file order, followed by one
    /// APIT configuration per effective date in date order.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<NewTaxRateConfig>, TaxRateLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers()?.clone();

        let mut configs = Vec::new();
        let mut apit_groups: BTreeMap<NaiveDate, (NewTaxRateConfig, Vec<ApitBracket>)> =
            BTreeMap::new();

        for result in csv_reader.records() {
            let row = result?;
            let line = row.position().map_or(0, |p| p.line());
            let record: TaxRateRecord = row.deserialize(Some(&headers))?;

            let tax_type = TaxType::parse(record.tax_type.trim()).ok_or_else(|| {
                TaxRateLoaderError::UnknownTaxType {
                    line,
                    value: record.tax_type.clone(),
                }
            })?;

            if tax_type != TaxType::Apit {
                configs.push(NewTaxRateConfig {
                    tax_type,
                    rate: record.rate,
                    brackets: Vec::new(),
                    applicable_from: record.applicable_from,
                    applicable_to: record.applicable_to,
                    is_active: record.is_active,
                    description: record.description,
                });
                continue;
            }

            let min_income = record
                .min_income
                .ok_or(TaxRateLoaderError::MissingMinIncome { line })?;
            let bracket = ApitBracket::new(min_income, record.max_income, record.rate);

            match apit_groups.entry(record.applicable_from) {
                Entry::Vacant(slot) => {
                    let config = NewTaxRateConfig {
                        tax_type,
                        rate: Decimal::ZERO,
                        brackets: Vec::new(),
                        applicable_from: record.applicable_from,
                        applicable_to: record.applicable_to,
                        is_active: record.is_active,
                        description: record.description,
                    };
                    slot.insert((config, vec![bracket]));
                }
                Entry::Occupied(mut slot) => {
                    let (config, brackets) = slot.get_mut();
                    if config.applicable_to != record.applicable_to
                        || config.is_active != record.is_active
                    {
                        return Err(TaxRateLoaderError::ConflictingApitRow {
                            line,
                            applicable_from: record.applicable_from,
                        });
                    }
                    if config.description.is_none() {
                        config.description = record.description;
                    }
                    brackets.push(bracket);
                }
            }
        }

        for (applicable_from, (mut config, mut brackets)) in apit_groups {
            brackets.sort_by(|a, b| a.min_income.cmp(&b.min_income));
            validate_brackets(&brackets).map_err(|source| TaxRateLoaderError::InvalidBrackets {
                applicable_from,
                source,
            })?;
            config.brackets = brackets;
            configs.push(config);
        }

        Ok(configs)
    }

    /// Store configurations through the repository.
    ///
    /// An active configuration already stored for the same tax type and
    /// `applicable_from` is deactivated first, so loading the same file
    /// twice leaves a single active copy.
    pub async fn load(
        repo: &dyn PayrollRepository,
        configs: &[NewTaxRateConfig],
    ) -> Result<usize, TaxRateLoaderError> {
        let existing = repo.list_tax_rate_configs().await?;
        let mut inserted = 0;

        for config in configs {
            for old in existing.iter().filter(|old| supersedes(config, old)) {
                debug!(id = old.id, tax_type = old.tax_type.as_str(), "deactivating replaced configuration");
                repo.deactivate_tax_rate_config(old.id).await?;
            }

            repo.insert_tax_rate_config(config.clone()).await?;
            inserted += 1;
        }

        Ok(inserted)
    }
}

fn supersedes(
    new: &NewTaxRateConfig,
    old: &TaxRateConfig,
) -> bool {
    old.is_active && old.tax_type == new.tax_type && old.applicable_from == new.applicable_from
}
