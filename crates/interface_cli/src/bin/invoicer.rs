//! Invoicer binary
//!
//! # Usage
//!
//! ```bash
//! invoicer next-number
//! invoicer add-client --name "Acme" --email ap@acme.test --address "1 Main St"
//! invoicer create-invoice --input draft.json --status sent --watermark
//! ```
//!
//! # Environment Variables
//!
//! * `INVOICER_LOG_LEVEL` - trace, debug, info, warn, error (default: info)
//! * `INVOICER_OUTPUT_DIR` - where PDFs are written (default: invoices)
//! * `INVOICER_DATA_DIR` - counters and client files (default: data)
//! * `INVOICER_DATABASE_URL` - keep counters in PostgreSQL instead
//! * `INVOICER_COMPANY__NAME`, `INVOICER_COMPANY__SLUG`, ... - company profile

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::SystemClock;
use domain_invoicing::{CounterStore, InvoicingService};
use infra_db::{create_pool, run_migrations, DatabaseConfig, JsonFileCounterStore, PgCounterStore};
use interface_cli::{execute, AppConfig, Cli, CliError, Command};

#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {:#}", err);
        let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    let company = config.company.to_company()?;
    tracing::info!(tenant = %company.id, company = %company.name, "Starting invoicer");

    let output = match config.database_url() {
        Some(url) => {
            let pool = create_pool(DatabaseConfig::new(url))
                .await
                .context("connecting to the counter database")?;
            run_migrations(&pool).await?;
            dispatch(cli.command, &config, company, PgCounterStore::new(pool)).await?
        }
        None => {
            let store = JsonFileCounterStore::open(config.counters_path())
                .await
                .with_context(|| format!("opening {}", config.counters_path().display()))?;
            dispatch(cli.command, &config, company, store).await?
        }
    };

    println!("{}", output);
    Ok(())
}

async fn dispatch<S: CounterStore>(
    command: Command,
    config: &AppConfig,
    company: domain_invoicing::Company,
    store: S,
) -> Result<String, CliError> {
    let service = InvoicingService::new(company, Arc::new(store), Arc::new(SystemClock)).await?;
    execute(command, config, &service).await
}

/// Initializes the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}
