//! Update feed CLI
//!
//! Runs ingestion passes and inspects the local store.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use update_feed::{
    config,
    error::Result,
    models::{Branch, LoggingConfig},
    pipeline,
    storage::{LocalStorage, UpdateFileStore, UpdateStore},
};

/// update-feed - GitHub release ingestion
#[derive(Parser, Debug)]
#[command(
    name = "update-feed",
    version,
    about = "Ingests GitHub releases into update records"
)]

struct Cli {
    /// Path to storage directory containing config.toml and the record files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one ingestion pass against GitHub
    Ingest,

    /// List stored updates, newest first
    List {
        /// Only show updates on this branch (master or develop)
        #[arg(long)]
        branch: Option<Branch>,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.storage_dir.join("config.toml");
    let loaded = config::load_config(&config_path);

    let fallback_level = LoggingConfig::default().level;
    let level = match &loaded {
        Ok(config) => config.logging.level.as_str(),
        Err(_) => fallback_level.as_str(),
    };
    init_logging(cli.verbose, level);

    let config = match loaded {
        Ok(config) => {
            log::info!("Loaded configuration from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            config::fallback_config()
        }
    };

    let storage = Arc::new(LocalStorage::new(&cli.storage_dir));

    match cli.command {
        Command::Ingest => {
            let touched = pipeline::run_ingest(&config, storage).await?;

            if touched.is_empty() {
                log::info!("No new releases");
            } else {
                for branch in touched {
                    log::info!("Branch {} has new updates", branch);
                }
            }
        }

        Command::List { branch } => {
            let mut updates = storage.list_all().await?;
            if let Some(branch) = branch {
                updates.retain(|u| u.branch == branch);
            }
            updates.sort_by(|a, b| b.int_version.cmp(&a.int_version).then(b.id.cmp(&a.id)));

            if updates.is_empty() {
                log::info!("No updates stored yet.");
            }

            for update in updates {
                let files = storage.files_for_update(update.id).await?;
                println!(
                    "{:<16} {:<8} {}  new: {:<3} fixed: {:<3} files: {}",
                    update.version,
                    update.branch,
                    update.release_date.format("%Y-%m-%d %H:%M"),
                    update.new.len(),
                    update.fixed.len(),
                    files.len()
                );
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!(
                "✓ Config OK (querying {}/{})",
                config.github.owner(),
                config.github.project
            );
        }
    }

    Ok(())
}
