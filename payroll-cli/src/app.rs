use anyhow::Result;
use chrono::NaiveDate;
use payroll_core::db::{DbConfig, RepositoryRegistry};
use payroll_core::{
    ApitScenario, EmployeeSalaryInput, PayPeriod, PayrollRepository, PayrollService,
};
use payroll_db_sqlite::SqliteRepositoryFactory;
use serde_json::Value;
use tracing::debug;

/// Build a registry with every backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

pub async fn open_repository(config: &DbConfig) -> Result<Box<dyn PayrollRepository>> {
    debug!(backend = %config.backend, "connecting to database");
    let repo = build_registry().create(config).await?;
    Ok(repo)
}

/// A fully resolved command, with configuration defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Calculate {
        input: EmployeeSalaryInput,
        as_of: NaiveDate,
    },
    CalculateEmployee {
        employee_id: i64,
        as_of: NaiveDate,
        scenario: Option<ApitScenario>,
    },
    Preview {
        period: PayPeriod,
        as_of: NaiveDate,
        scenario: Option<ApitScenario>,
    },
    Generate {
        period: PayPeriod,
        as_of: NaiveDate,
        scenario: Option<ApitScenario>,
    },
    Rates {
        as_of: NaiveDate,
    },
    Records {
        period: Option<PayPeriod>,
    },
}

/// Run `request` against `repo` and return its JSON output.
pub async fn execute(
    repo: &dyn PayrollRepository,
    request: Request,
) -> Result<Value> {
    let service = PayrollService::new(repo);

    let value = match request {
        Request::Calculate { input, as_of } => {
            serde_json::to_value(service.calculate(&input, as_of).await)?
        }
        Request::CalculateEmployee {
            employee_id,
            as_of,
            scenario,
        } => serde_json::to_value(
            service
                .calculate_for_employee(employee_id, as_of, scenario)
                .await?,
        )?,
        Request::Preview {
            period,
            as_of,
            scenario,
        } => serde_json::to_value(service.preview_run(period, as_of, scenario).await?)?,
        Request::Generate {
            period,
            as_of,
            scenario,
        } => serde_json::to_value(service.generate_run(period, as_of, scenario).await?)?,
        Request::Rates { as_of } => serde_json::to_value(service.rates(as_of).await)?,
        Request::Records { period } => {
            serde_json::to_value(repo.list_payroll_records(period).await?)?
        }
    };

    Ok(value)
}
