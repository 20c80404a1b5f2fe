use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use env_warden_cli::commands::environment_cmd::{self, ConfigureArgs};
use env_warden_cli::commands::sync_cmd::{self, SyncArgs};
use env_warden_cli::config::{ConnectionArgs, Settings};
use env_warden_cli::errors::Error;
use env_warden_cli::outputs::Outputs;

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Environment variable holding the log filter.
const LOG_FILTER_VARIABLE: &str = "ENV_WARDEN_LOG";

/// EnvWarden CLI: Keep GitHub deployment environments in line with a YAML document
#[derive(Parser)]
#[command(name = "env-warden")]
#[command(
    about = "Reconcile GitHub deployment environments with a desired-state document",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable debug logging.
    #[arg(long, global = true, env = "INPUT_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile all environments with the desired-state document
    Sync(SyncArgs),

    /// Print the current configuration of an environment
    Get {
        /// Name of the environment
        name: String,
    },

    /// Delete an environment
    Delete {
        /// Name of the environment
        name: String,
    },

    /// Create or update a single environment
    Configure(ConfigureArgs),
}

fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_FILTER_VARIABLE).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

async fn execute(cli: &Cli) -> Result<Outputs, Error> {
    let settings = Settings::from_args(&cli.connection)?;
    let client = settings.client()?;
    let repository = settings.repository;

    match &cli.command {
        Commands::Sync(args) => sync_cmd::execute(args, client, repository).await,
        Commands::Get { name } => environment_cmd::get(name, client, repository).await,
        Commands::Delete { name } => environment_cmd::delete(name, client, repository).await,
        Commands::Configure(args) => environment_cmd::configure(args, client, repository).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so that stdout only carries the outputs
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.debug))
        .init();

    if cli.debug {
        info!("Debug mode is enabled");
    }

    let outputs = match execute(&cli).await {
        Ok(outputs) => outputs,
        Err(e) => {
            error!("Error: {e}");
            Outputs::failure(&e)
        }
    };

    print!("{}", outputs.render());
    if let Err(e) = outputs.write_github_output() {
        error!("Error: {e}");
        std::process::exit(1);
    }

    if outputs.is_failure() {
        std::process::exit(1);
    }
}
