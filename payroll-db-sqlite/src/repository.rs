use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use payroll_core::{
    ApitBracket, ApitScenario, Employee, NewEmployee, NewPayrollRecord, NewTaxRateConfig,
    PayPeriod, PayrollComputationResult, PayrollRecord, PayrollRepository, PayrollStatus,
    RepositoryError, TaxRateConfig, TaxType,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_decimal, get_optional_decimal};

const EMPLOYEE_COLUMNS: &str = "id, employee_number, full_name, basic_salary, performance_salary,
    transport_allowance, other_allowances, apit_scenario, epf_employee_rate,
    epf_employer_rate, etf_rate, is_active";

const PAYROLL_RECORD_COLUMNS: &str = "id, employee_id, period_year, period_month, basic_salary,
    allowances, apit_scenario, gross_salary, epf_employee, epf_employer, etf, apit,
    apit_employer, stamp_fee, total_deductions, net_salary, total_ctc, status, created_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `database_url`.
    ///
    /// Accepts a sqlx URL (`sqlite:payroll.db?mode=rwc`), a bare file path
    /// (created if missing) or `:memory:`. An in-memory database is held on
    /// a single connection that is never recycled, so it lives as long as
    /// the repository.
    pub async fn new(database_url: &str) -> Result<Self> {
        let in_memory = matches!(database_url, ":memory:" | "sqlite::memory:");
        let options = if in_memory {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else if database_url.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(database_url)
                .with_context(|| format!("Invalid database URL: {}", database_url))?
        } else {
            SqliteConnectOptions::new()
                .filename(database_url)
                .create_if_missing(true)
        };

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get '{}': {}", column, e)))
}

fn parse_column<T>(
    value: &str,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, RepositoryError> {
    parse(value).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid value '{}' in column '{}'", value, column))
    })
}

fn row_to_tax_rate_config(
    row: &SqliteRow,
    brackets: Vec<ApitBracket>,
) -> Result<TaxRateConfig, RepositoryError> {
    let tax_type: String = get(row, "tax_type")?;
    Ok(TaxRateConfig {
        id: get(row, "id")?,
        tax_type: parse_column(&tax_type, "tax_type", TaxType::parse)?,
        rate: get_decimal(row, "rate")?,
        brackets,
        applicable_from: get::<NaiveDate>(row, "applicable_from")?,
        applicable_to: get::<Option<NaiveDate>>(row, "applicable_to")?,
        is_active: get(row, "is_active")?,
        description: get(row, "description")?,
    })
}

fn row_to_employee(row: &SqliteRow) -> Result<Employee, RepositoryError> {
    let scenario: String = get(row, "apit_scenario")?;
    Ok(Employee {
        id: get(row, "id")?,
        employee_number: get(row, "employee_number")?,
        full_name: get(row, "full_name")?,
        basic_salary: get_decimal(row, "basic_salary")?,
        performance_salary: get_decimal(row, "performance_salary")?,
        transport_allowance: get_decimal(row, "transport_allowance")?,
        other_allowances: get_decimal(row, "other_allowances")?,
        apit_scenario: parse_column(&scenario, "apit_scenario", ApitScenario::parse)?,
        epf_employee_rate: get_optional_decimal(row, "epf_employee_rate")?,
        epf_employer_rate: get_optional_decimal(row, "epf_employer_rate")?,
        etf_rate: get_optional_decimal(row, "etf_rate")?,
        is_active: get(row, "is_active")?,
    })
}

fn row_to_payroll_record(row: &SqliteRow) -> Result<PayrollRecord, RepositoryError> {
    let scenario: String = get(row, "apit_scenario")?;
    let status: String = get(row, "status")?;
    let month: i64 = get(row, "period_month")?;
    let month = u32::try_from(month)
        .map_err(|e| RepositoryError::Database(format!("Invalid period_month {}: {}", month, e)))?;
    let period = PayPeriod::new(get(row, "period_year")?, month)
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

    Ok(PayrollRecord {
        id: get(row, "id")?,
        employee_id: get(row, "employee_id")?,
        period,
        result: PayrollComputationResult {
            basic_salary: get_decimal(row, "basic_salary")?,
            allowances: get_decimal(row, "allowances")?,
            apit_scenario: parse_column(&scenario, "apit_scenario", ApitScenario::parse)?,
            gross_salary: get_decimal(row, "gross_salary")?,
            epf_employee: get_decimal(row, "epf_employee")?,
            epf_employer: get_decimal(row, "epf_employer")?,
            etf: get_decimal(row, "etf")?,
            apit: get_decimal(row, "apit")?,
            apit_employer: get_decimal(row, "apit_employer")?,
            stamp_fee: get_decimal(row, "stamp_fee")?,
            total_deductions: get_decimal(row, "total_deductions")?,
            net_salary: get_decimal(row, "net_salary")?,
            total_ctc: get_decimal(row, "total_ctc")?,
        },
        status: parse_column(&status, "status", PayrollStatus::parse)?,
        created_at: get::<DateTime<Utc>>(row, "created_at")?,
    })
}

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn list_tax_rate_configs(&self) -> Result<Vec<TaxRateConfig>, RepositoryError> {
        let bracket_rows = sqlx::query(
            "SELECT config_id, min_income, max_income, rate
             FROM apit_bracket
             ORDER BY config_id, position",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut brackets: HashMap<i64, Vec<ApitBracket>> = HashMap::new();
        for row in &bracket_rows {
            brackets
                .entry(get(row, "config_id")?)
                .or_default()
                .push(ApitBracket {
                    min_income: get_decimal(row, "min_income")?,
                    max_income: get_optional_decimal(row, "max_income")?,
                    rate: get_decimal(row, "rate")?,
                });
        }

        let rows = sqlx::query(
            "SELECT id, tax_type, rate, applicable_from, applicable_to, is_active, description
             FROM tax_rate_config
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let id: i64 = get(row, "id")?;
                row_to_tax_rate_config(row, brackets.remove(&id).unwrap_or_default())
            })
            .collect()
    }

    async fn insert_tax_rate_config(
        &self,
        config: NewTaxRateConfig,
    ) -> Result<TaxRateConfig, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO tax_rate_config
                (tax_type, rate, applicable_from, applicable_to, is_active, description)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(config.tax_type.as_str())
        .bind(decimal_to_text(config.rate))
        .bind(config.applicable_from)
        .bind(config.applicable_to)
        .bind(config.is_active)
        .bind(&config.description)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();

        for (position, bracket) in config.brackets.iter().enumerate() {
            sqlx::query(
                "INSERT INTO apit_bracket (config_id, position, min_income, max_income, rate)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(decimal_to_text(bracket.min_income))
            .bind(bracket.max_income.map(decimal_to_text))
            .bind(decimal_to_text(bracket.rate))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(TaxRateConfig {
            id,
            tax_type: config.tax_type,
            rate: config.rate,
            brackets: config.brackets,
            applicable_from: config.applicable_from,
            applicable_to: config.applicable_to,
            is_active: config.is_active,
            description: config.description,
        })
    }

    async fn deactivate_tax_rate_config(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tax_rate_config SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_employee(
        &self,
        employee: NewEmployee,
    ) -> Result<Employee, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO employee (
                employee_number, full_name, basic_salary, performance_salary,
                transport_allowance, other_allowances, apit_scenario,
                epf_employee_rate, epf_employer_rate, etf_rate, is_active
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&employee.employee_number)
        .bind(&employee.full_name)
        .bind(decimal_to_text(employee.basic_salary))
        .bind(decimal_to_text(employee.performance_salary))
        .bind(decimal_to_text(employee.transport_allowance))
        .bind(decimal_to_text(employee.other_allowances))
        .bind(employee.apit_scenario.as_str())
        .bind(employee.epf_employee_rate.map(decimal_to_text))
        .bind(employee.epf_employer_rate.map(decimal_to_text))
        .bind(employee.etf_rate.map(decimal_to_text))
        .bind(employee.is_active)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_employee(result.last_insert_rowid()).await
    }

    async fn get_employee(
        &self,
        id: i64,
    ) -> Result<Employee, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {} FROM employee WHERE id = ?", EMPLOYEE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_employee(&row)
    }

    async fn list_employees(
        &self,
        active_only: bool,
    ) -> Result<Vec<Employee>, RepositoryError> {
        let filter = if active_only { " WHERE is_active = 1" } else { "" };
        let rows = sqlx::query(&format!(
            "SELECT {} FROM employee{} ORDER BY employee_number",
            EMPLOYEE_COLUMNS, filter
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_employee).collect()
    }

    async fn create_payroll_records(
        &self,
        records: Vec<NewPayrollRecord>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        let created_at = Utc::now();
        let mut stored = Vec::with_capacity(records.len());

        for record in &records {
            let r = &record.result;
            let result = sqlx::query(
                "INSERT INTO payroll_record (
                    employee_id, period_year, period_month, basic_salary, allowances,
                    apit_scenario, gross_salary, epf_employee, epf_employer, etf, apit,
                    apit_employer, stamp_fee, total_deductions, net_salary, total_ctc,
                    status, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(record.employee_id)
            .bind(record.period.year)
            .bind(i64::from(record.period.month))
            .bind(decimal_to_text(r.basic_salary))
            .bind(decimal_to_text(r.allowances))
            .bind(r.apit_scenario.as_str())
            .bind(decimal_to_text(r.gross_salary))
            .bind(decimal_to_text(r.epf_employee))
            .bind(decimal_to_text(r.epf_employer))
            .bind(decimal_to_text(r.etf))
            .bind(decimal_to_text(r.apit))
            .bind(decimal_to_text(r.apit_employer))
            .bind(decimal_to_text(r.stamp_fee))
            .bind(decimal_to_text(r.total_deductions))
            .bind(decimal_to_text(r.net_salary))
            .bind(decimal_to_text(r.total_ctc))
            .bind(record.status.as_str())
            .bind(created_at)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

            let row = sqlx::query(&format!(
                "SELECT {} FROM payroll_record WHERE id = ?",
                PAYROLL_RECORD_COLUMNS
            ))
            .bind(result.last_insert_rowid())
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
            stored.push(row_to_payroll_record(&row)?);
        }

        // Dropping `tx` on any error above rolls back the whole batch
        tx.commit().await.map_err(db_err)?;
        debug!(records = stored.len(), "stored payroll records");
        Ok(stored)
    }

    async fn list_payroll_records(
        &self,
        period: Option<PayPeriod>,
    ) -> Result<Vec<PayrollRecord>, RepositoryError> {
        let rows = match period {
            Some(period) => {
                sqlx::query(&format!(
                    "SELECT {} FROM payroll_record
                     WHERE period_year = ? AND period_month = ?
                     ORDER BY id",
                    PAYROLL_RECORD_COLUMNS
                ))
                .bind(period.year)
                .bind(i64::from(period.month))
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM payroll_record
                     ORDER BY period_year, period_month, id",
                    PAYROLL_RECORD_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_payroll_record).collect()
    }

    async fn count_payroll_records(
        &self,
        period: PayPeriod,
    ) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM payroll_record WHERE period_year = ? AND period_month = ?",
        )
        .bind(period.year)
        .bind(i64::from(period.month))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        get(&row, "n")
    }
}
