use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sketchlink_infrastructure::ConfigService;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "sketchlink")]
#[command(about = "sketchlink - diagram records for an embedded diagram editor", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a stored record
    Show {
        /// Record id
        id: String,
    },
    /// Create an empty record
    New {
        /// Record id
        id: String,
        /// Diagram name shown as the editor title
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the load command the editor would receive for a record
    LoadCommand {
        /// Record id
        id: String,
    },
    /// Apply a raw editor message to a record
    ApplyExport {
        /// Record id
        id: String,
        /// File containing the message (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print a Content-Security-Policy opened to the editor
    Csp {
        /// Existing header value to extend
        #[arg(long)]
        header: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new().context("Failed to locate config directory")?,
    };
    let config = config_service
        .get_config()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    let _log_guard = sketchlink_tracing::init_logging(&config.logging, None)
        .context("Failed to initialize logging")?;

    match cli.command {
        Commands::Show { id } => commands::record::show(&config, &id).await?,
        Commands::New { id, name } => commands::record::create(&config, &id, name).await?,
        Commands::LoadCommand { id } => commands::protocol::load_command(&config, &id).await?,
        Commands::ApplyExport { id, input } => {
            commands::protocol::apply_export(&config, &id, input.as_deref()).await?
        }
        Commands::Csp { header } => commands::csp::run(&config, header.as_deref()),
        Commands::Config => commands::config::show(&config_service, &config)?,
    }

    Ok(())
}
