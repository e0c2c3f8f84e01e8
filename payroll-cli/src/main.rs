use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use payroll_core::{ApitScenario, EmployeeSalaryInput, PayPeriod};
use rust_decimal::Decimal;
use tracing::debug;

use payroll_cli::app::{self, Request};
use payroll_cli::config::{AppConfig, DEFAULT_CONFIG_FILE};
use payroll_cli::logging;
use payroll_cli::utils::{parse_date, parse_decimal, parse_period, parse_scenario};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Sri Lankan payroll calculator: EPF, ETF, APIT and stamp duty.
///
/// Every command prints its result as JSON on stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "payroll", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to `payroll.toml` when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database backend, overriding the configuration file.
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Database connection string, overriding the configuration file.
    /// For SQLite this is a file path (e.g. `payroll.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log level or filter directive, overriding the configuration file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Date whose rates apply (YYYY-MM-DD). Defaults to the first day of the
    /// period for `preview` and `generate`, and to today otherwise.
    #[arg(long, global = true, value_parser = parse_date)]
    as_of: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Calculate one payslip, either from figures or for a stored employee.
    Calculate(CalculateArgs),

    /// Compute the payroll run for a period without saving it.
    Preview(RunArgs),

    /// Compute the payroll run for a period and save draft records.
    Generate(RunArgs),

    /// Show the rates in force.
    Rates,

    /// List saved payroll records.
    Records {
        /// Only records for this period (YYYY-MM).
        #[arg(long, value_parser = parse_period)]
        period: Option<PayPeriod>,
    },
}

#[derive(Debug, Args)]
struct CalculateArgs {
    /// Stored employee to calculate for.
    #[arg(long, conflicts_with_all = ["basic", "allowances", "epf_employee_rate", "epf_employer_rate", "etf_rate"])]
    employee: Option<i64>,

    /// Basic salary.
    #[arg(long, value_parser = parse_decimal, required_unless_present = "employee")]
    basic: Option<Decimal>,

    /// Sum of all allowances.
    #[arg(long, value_parser = parse_decimal)]
    allowances: Option<Decimal>,

    /// Who bears APIT: `employee` or `employer`.
    #[arg(long, value_parser = parse_scenario)]
    scenario: Option<ApitScenario>,

    /// EPF employee rate override, in percent.
    #[arg(long, value_parser = parse_decimal)]
    epf_employee_rate: Option<Decimal>,

    /// EPF employer rate override, in percent.
    #[arg(long, value_parser = parse_decimal)]
    epf_employer_rate: Option<Decimal>,

    /// ETF rate override, in percent.
    #[arg(long, value_parser = parse_decimal)]
    etf_rate: Option<Decimal>,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Pay period (YYYY-MM).
    #[arg(long, value_parser = parse_period)]
    period: PayPeriod,

    /// Apply this APIT scenario to every employee in the run.
    #[arg(long, value_parser = parse_scenario)]
    scenario: Option<ApitScenario>,
}

// ─── configuration ───────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let (path, required) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    let mut config = AppConfig::load(&path, required)?;

    if let Some(backend) = &cli.backend {
        config.database.backend = backend.clone();
    }
    if let Some(db) = &cli.db {
        config.database.connection_string = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn to_request(
    command: Commands,
    as_of: Option<NaiveDate>,
    today: NaiveDate,
    config: &AppConfig,
) -> Request {
    let run_as_of = |period: PayPeriod| as_of.or_else(|| period.first_day()).unwrap_or(today);
    let as_of = as_of.unwrap_or(today);

    match command {
        Commands::Calculate(args) => match args.employee {
            Some(employee_id) => Request::CalculateEmployee {
                employee_id,
                as_of,
                scenario: args.scenario,
            },
            None => {
                let mut input = EmployeeSalaryInput::new(
                    args.basic.unwrap_or_default(),
                    args.allowances.unwrap_or_default(),
                    args.scenario.unwrap_or(config.payroll.default_scenario),
                );
                input.epf_employee_rate = args.epf_employee_rate;
                input.epf_employer_rate = args.epf_employer_rate;
                input.etf_rate = args.etf_rate;
                Request::Calculate { input, as_of }
            }
        },
        Commands::Preview(args) => Request::Preview {
            period: args.period,
            as_of: run_as_of(args.period),
            scenario: args.scenario,
        },
        Commands::Generate(args) => Request::Generate {
            period: args.period,
            as_of: run_as_of(args.period),
            scenario: args.scenario,
        },
        Commands::Rates => Request::Rates { as_of },
        Commands::Records { period } => Request::Records { period },
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    logging::init_logging(&config.logging.level, config.logging.file.as_deref())?;

    let today = Local::now().date_naive();
    let request = to_request(cli.command, cli.as_of, today, &config);
    debug!(?request, "resolved command");

    let repo = app::open_repository(&config.db_config())
        .await
        .with_context(|| format!("cannot open database '{}'", config.database.connection_string))?;

    let output = app::execute(repo.as_ref(), request).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
