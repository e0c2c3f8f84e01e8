use chrono::NaiveDate;
use payroll_core::calculations::MAX_INPUT_AMOUNT;
use rust_decimal::Decimal;
use serde::Deserialize;

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Parses an amount or rate, holding it to [`MAX_INPUT_AMOUNT`].
fn parse_amount<E: serde::de::Error>(s: &str) -> Result<Decimal, E> {
    let value = s.parse::<Decimal>().map_err(E::custom)?;
    if value.abs() > MAX_INPUT_AMOUNT {
        return Err(E::custom(format!(
            "amount '{}' is out of range (limit {})",
            s, MAX_INPUT_AMOUNT
        )));
    }
    Ok(value)
}

/// A required amount column.
pub(crate) fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_amount(s.trim())
}

pub(crate) fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match non_empty(Option::deserialize(deserializer)?) {
        Some(s) => parse_amount(&s).map(Some),
        None => Ok(None),
    }
}

/// An empty amount column reads as zero.
pub(crate) fn decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(optional_decimal(deserializer)?.unwrap_or_default())
}

pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match non_empty(Option::deserialize(deserializer)?) {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(non_empty(Option::deserialize(deserializer)?))
}

/// Boolean column accepting `true/false`, `yes/no` and `1/0`. Empty is true.
pub(crate) fn active_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(s) = non_empty(Option::deserialize(deserializer)?) else {
        return Ok(true);
    };
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean '{}'",
            other
        ))),
    }
}

pub(crate) fn default_true() -> bool {
    true
}
