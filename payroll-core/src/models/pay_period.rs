use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid pay period {year}-{month:02}")]
pub struct PayPeriodError {
    pub year: i32,
    pub month: u32,
}

/// A calendar month that a payroll run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    pub year: i32,
    pub month: u32,
}

impl PayPeriod {
    pub fn new(
        year: i32,
        month: u32,
    ) -> Result<Self, PayPeriodError> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(PayPeriodError { year, month });
        }
        Ok(Self { year, month })
    }

    /// First calendar day of the period. `None` only for a hand-built
    /// period that is not a real month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
