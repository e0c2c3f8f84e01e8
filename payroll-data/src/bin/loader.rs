use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use payroll_data::{EmployeeLoader, TaxRateLoader};
use payroll_db_sqlite::SqliteRepository;

/// Load tax rate configuration and employees from CSV files into the database.
///
/// The rates CSV has the columns
/// `tax_type,rate,applicable_from,applicable_to,is_active,min_income,max_income,description`,
/// with one `apit` row per bracket. The employees CSV needs at least
/// `employee_number,full_name,basic_salary`.
#[derive(Parser, Debug)]
#[command(name = "payroll-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax rate configuration
    #[arg(short, long)]
    rates: Option<PathBuf>,

    /// Path to the CSV file containing employees
    #[arg(short, long)]
    employees: Option<PathBuf>,

    /// SQLite database URL (e.g., sqlite:payroll.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:payroll.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.rates.is_none() && args.employees.is_none() && !args.migrate && args.seeds.is_none() {
        bail!("nothing to do: pass --rates, --employees, --migrate or --seeds");
    }

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    if let Some(path) = &args.rates {
        println!("Loading tax rates from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let configs = TaxRateLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

        println!("Parsed {} rate configurations from CSV", configs.len());

        let inserted = TaxRateLoader::load(&repo, &configs)
            .await
            .context("Failed to load tax rates into the database")?;

        println!("Successfully loaded {} rate configurations.", inserted);
    }

    if let Some(path) = &args.employees {
        println!("Loading employees from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open: {}", path.display()))?;
        let employees = EmployeeLoader::parse(file)
            .with_context(|| format!("Failed to parse CSV: {}", path.display()))?;

        println!("Parsed {} employees from CSV", employees.len());

        let created = EmployeeLoader::load(&repo, &employees)
            .await
            .context("Failed to load employees into the database")?;

        println!(
            "Successfully created {} employees ({} already present).",
            created,
            employees.len() - created
        );
    }

    Ok(())
}
