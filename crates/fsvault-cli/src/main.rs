mod cli;
mod config;
mod storage;

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use fsvault_storage::FileStorage;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const PROBE_KEY: &str = "health/probe";

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?.with_overrides(cli.location, cli.folder);
    match cli.command {
        cli::Command::Version => print_version(),
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
        command => {
            let store = storage::storage_from_config(&config)?;
            for line in run(&store, command).await? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("fsvault {}", env!("CARGO_PKG_VERSION"));
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

/// Execute a storage command, returning the lines to print.
async fn run(store: &FileStorage, command: cli::Command) -> Result<Vec<String>> {
    let lines = match command {
        cli::Command::Set { key, value } => {
            store.set_item(&key, &value).await?;
            vec![format!("Stored {key}")]
        }
        cli::Command::Get { key } => match store.get_item(&key).await? {
            Some(value) => vec![value],
            None => vec!["(not found)".to_string()],
        },
        cli::Command::Remove { key } => {
            store.remove_item(&key).await?;
            vec![format!("Removed {key}")]
        }
        cli::Command::Keys => {
            let mut keys = store.get_all_keys().await?;
            keys.sort();
            keys
        }
        cli::Command::Health => {
            run_store_health(store).await?;
            vec!["Storage: ok".to_string()]
        }
        cli::Command::Version | cli::Command::Config(_) => Vec::new(),
    };
    Ok(lines)
}

/// Runs a quick health check of the encrypted storage path.
async fn run_store_health(store: &FileStorage) -> Result<()> {
    let payload = "ok";
    store.set_item(PROBE_KEY, payload).await?;
    let round_trip = store.get_item(PROBE_KEY).await?;
    store.remove_item(PROBE_KEY).await?;

    if round_trip.as_deref() != Some(payload) {
        color_eyre::eyre::bail!("storage round-trip failed");
    }
    info!(folder = store.base_folder(), "storage health check passed");
    Ok(())
}
