use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webhook_reconciler_cli::commands::{self, Operation};
use webhook_reconciler_cli::config::{AppConfig, DEFAULT_CONFIG_FILENAME};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// git-webhook: Converge GitHub and GitLab webhooks onto their declarations
#[derive(Parser, Debug)]
#[command(name = "git-webhook")]
#[command(about = "Converge GitHub and GitLab webhooks onto their declarations", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the selected webhooks (all when none are named)
    Apply {
        /// Webhook names, `name` or `namespace/name`
        names: Vec<String>,
    },

    /// Delete the selected webhooks if they exist
    Delete {
        /// Webhook names, `name` or `namespace/name`
        names: Vec<String>,
    },

    /// Check the selected declarations without contacting a provider
    Validate {
        /// Webhook names, `name` or `namespace/name`
        names: Vec<String>,
    },

    /// Show the CLI version
    Version,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("GIT_WEBHOOK_LOG"))
        .init();

    let cli = Cli::parse();
    let exit_code = match &cli.command {
        Commands::Version => {
            println!("git-webhook version {}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Apply { names } => run(&cli.config, Operation::Apply, names).await,
        Commands::Delete { names } => run(&cli.config, Operation::Delete, names).await,
        Commands::Validate { names } => validate(&cli.config, names),
    };
    std::process::exit(exit_code);
}

async fn run(config_path: &Path, operation: Operation, names: &[String]) -> i32 {
    let config = match AppConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Error: {e}");
            return 2;
        }
    };

    let outcomes = match commands::run(&config, operation, names).await {
        Ok(outcomes) => outcomes,
        Err(e) => {
            error!("Error: {e}");
            return 2;
        }
    };

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(action) => println!("{}: {}", outcome.webhook, action),
            Err(e) => {
                failed += 1;
                let hint = if e.is_retryable() { " (retryable)" } else { "" };
                println!("{}: failed{}: {}", outcome.webhook, hint, e);
            }
        }
    }
    i32::from(failed > 0)
}

fn validate(config_path: &Path, names: &[String]) -> i32 {
    let results = match AppConfig::load(config_path).and_then(|c| commands::validate(&c, names)) {
        Ok(results) => results,
        Err(e) => {
            error!("Error: {e}");
            return 2;
        }
    };

    let mut invalid = 0;
    for (webhook, result) in &results {
        match result {
            Ok(()) => println!("{webhook}: valid"),
            Err(e) => {
                invalid += 1;
                println!("{webhook}: invalid: {e}");
            }
        }
    }
    i32::from(invalid > 0)
}
