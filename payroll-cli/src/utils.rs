use chrono::NaiveDate;
use payroll_core::calculations::MAX_INPUT_AMOUNT;
use payroll_core::{ApitScenario, PayPeriod};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as an amount.
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("invalid decimal '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("amount '{input}' is out of range (limit {})", MAX_INPUT_AMOUNT)]
    OutOfRange { input: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseArgError {
    #[error("invalid pay period '{0}', expected YYYY-MM")]
    Period(String),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("unknown APIT scenario '{0}', expected 'employee' or 'employer'")]
    Scenario(String),
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0. Values beyond
/// [`MAX_INPUT_AMOUNT`] in magnitude are rejected.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let value: Decimal = normalized.parse().map_err(|e| ParseDecimalError::Invalid {
        input: s.to_string(),
        source: e,
    })?;
    if value.abs() > MAX_INPUT_AMOUNT {
        return Err(ParseDecimalError::OutOfRange {
            input: s.to_string(),
        });
    }
    Ok(value)
}

/// Parses `YYYY-MM` into a [`PayPeriod`].
pub fn parse_period(s: &str) -> Result<PayPeriod, ParseArgError> {
    let err = || ParseArgError::Period(s.to_string());
    let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
    let year = year.parse().map_err(|_| err())?;
    let month = month.parse().map_err(|_| err())?;
    PayPeriod::new(year, month).map_err(|_| err())
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ParseArgError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| ParseArgError::Date(s.to_string()))
}

pub fn parse_scenario(s: &str) -> Result<ApitScenario, ParseArgError> {
    ApitScenario::parse(&s.trim().to_ascii_lowercase())
        .ok_or_else(|| ParseArgError::Scenario(s.to_string()))
}
