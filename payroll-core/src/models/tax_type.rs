use serde::{Deserialize, Serialize};

/// Statutory charge a rate-configuration entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    EpfEmployee,
    EpfEmployer,
    Etf,
    StampFee,
    Apit,
}

impl TaxType {
    pub const ALL: [TaxType; 5] = [
        Self::EpfEmployee,
        Self::EpfEmployer,
        Self::Etf,
        Self::StampFee,
        Self::Apit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EpfEmployee => "epf_employee",
            Self::EpfEmployer => "epf_employer",
            Self::Etf => "etf",
            Self::StampFee => "stamp_fee",
            Self::Apit => "apit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "epf_employee" => Some(Self::EpfEmployee),
            "epf_employer" => Some(Self::EpfEmployer),
            "etf" => Some(Self::Etf),
            "stamp_fee" => Some(Self::StampFee),
            "apit" => Some(Self::Apit),
            _ => None,
        }
    }
}
