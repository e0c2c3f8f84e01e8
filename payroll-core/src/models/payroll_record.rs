use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{PayPeriod, PayrollComputationResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    #[default]
    Draft,
    Approved,
    Paid,
}

impl PayrollStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

/// A persisted payroll computation for one employee and pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollRecord {
    pub id: i64,
    pub employee_id: i64,
    pub period: PayPeriod,
    #[serde(flatten)]
    pub result: PayrollComputationResult,
    pub status: PayrollStatus,
    pub created_at: DateTime<Utc>,
}

/// For creating new payroll records (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayrollRecord {
    pub employee_id: i64,
    pub period: PayPeriod,
    #[serde(flatten)]
    pub result: PayrollComputationResult,
    pub status: PayrollStatus,
}
