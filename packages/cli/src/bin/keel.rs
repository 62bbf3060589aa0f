use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use keel_cli::output::{effective_values_table, records_table};
use keel_cli::{load_defaults, logging, CliConfig};
use keel_settings::SettingsProvider;
use keel_storage::{SettingStore, SqliteStore};
use tracing::debug;

#[derive(Parser)]
#[command(name = "keel")]
#[command(about = "Keel - reconcile settings with a shared store")]
#[command(version)]
struct Cli {
    /// Database URL (overrides KEEL_DATABASE_URL)
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge the store to a defaults file and label unknown settings
    Reconcile {
        /// JSON object mapping setting names to defaults
        #[arg(long)]
        defaults: PathBuf,
    },
    /// Print the effective value of a setting
    Get {
        name: String,
    },
    /// Store a value for a setting
    Set {
        name: String,
        value: String,
        /// Only write when no value is stored yet
        #[arg(long)]
        if_unset: bool,
    },
    /// List stored setting records
    List,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_env()
        .context("Invalid configuration")?
        .with_database_url(cli.database);
    debug!("Using database {}", config.database_url);

    let store = Arc::new(
        SqliteStore::connect(&config.database_url)
            .await
            .with_context(|| format!("Failed to open {}", config.database_url))?,
    );
    let provider = SettingsProvider::from_config(store.clone(), &config.reconcile);

    match cli.command {
        Commands::Reconcile { defaults } => {
            let desired = load_defaults(&defaults)
                .with_context(|| format!("Failed to load {}", defaults.display()))?;

            provider.set_all(&desired).await?;

            let values = provider.fallback().snapshot().await;
            println!("{}", effective_values_table(&values));
            println!(
                "{} {} settings reconciled",
                "✓".green().bold(),
                desired.len().to_string().cyan()
            );
        }
        Commands::Get { name } => match provider.get(&name).await {
            Some(value) => println!("{}", value),
            None => anyhow::bail!("Setting '{}' not found", name),
        },
        Commands::Set {
            name,
            value,
            if_unset,
        } => {
            let record = if if_unset {
                provider.set_if_unset(&name, &value).await?
            } else {
                provider.set(&name, &value).await?
            };
            println!("{} = {}", record.name.bold(), record.effective_value());
        }
        Commands::List => {
            let records = store.list().await?;
            if records.is_empty() {
                println!("{}", "No settings stored".yellow());
                return Ok(());
            }
            println!("{}", records_table(&records));
            println!("Total: {} settings", records.len().to_string().cyan());
        }
    }

    Ok(())
}
