use std::fmt;

use serde::{Deserialize, Serialize};

/// Who bears the APIT withholding on a payslip.
///
/// `Employee` (scenario A) debits the employee's net pay; `Employer`
/// (scenario B) adds the tax to the employer's cost instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApitScenario {
    #[default]
    Employee,
    Employer,
}

impl ApitScenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Employer => "employer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "employee" => Some(Self::Employee),
            "employer" => Some(Self::Employer),
            _ => None,
        }
    }
}

impl fmt::Display for ApitScenario {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
