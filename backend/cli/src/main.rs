mod components;
mod config_cmd;
mod prompt;
mod submit_cmd;
mod terminal_output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use idcapture_config::{config_dir, config_file_path, load_and_prepare, BackendKind, IdCaptureConfig};
use idcapture_config::defaults::{DEFAULT_LOG_DIR, DEFAULT_LOG_LEVEL};
use idcapture_core::{validate_employee_id, ID_FORMAT_HINT};

use components::OverwritePolicy;
use terminal_output::{note_error, note_success};

#[derive(Parser)]
#[command(name = "idcapture")]
#[command(about = "Capture an employee's identity document and save the extracted fields")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.idcapture/config.yaml)
    #[arg(long, global = true, env = "IDCAPTURE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a document photo and save it under an employee ID
    Submit {
        /// Employee ID (VAE + 5 digits)
        #[arg(short, long)]
        employee_id: String,
        /// Document photo (png, jpg, jpeg)
        #[arg(short, long)]
        image: PathBuf,
        #[command(flatten)]
        overwrite: OverwriteArgs,
        /// Override the configured backend
        #[arg(long)]
        backend: Option<BackendKind>,
    },
    /// Fill the form interactively, one submission after another
    Form {
        #[command(flatten)]
        overwrite: OverwriteArgs,
        #[arg(long)]
        backend: Option<BackendKind>,
    },
    /// Check an employee ID against the accepted format
    Validate {
        employee_id: String,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args)]
struct OverwriteArgs {
    /// Overwrite an existing record without asking
    #[arg(long, conflicts_with = "no_overwrite")]
    yes: bool,
    /// Never overwrite an existing record
    #[arg(long)]
    no_overwrite: bool,
}

impl OverwriteArgs {
    fn policy(&self) -> OverwritePolicy {
        OverwritePolicy::from_flags(self.yes, self.no_overwrite)
    }
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config with secrets masked
    Show,
    /// Validate the effective config
    Check,
}

async fn load(cli_path: Option<PathBuf>, backend: Option<BackendKind>) -> Result<(IdCaptureConfig, PathBuf)> {
    let path = cli_path.unwrap_or_else(|| config_file_path(&config_dir()));
    let mut config = load_and_prepare(&path).await?;
    if let Some(kind) = backend {
        config.backend.kind = kind;
    }
    Ok((config, path))
}

fn init_file_logging(config: &IdCaptureConfig) {
    logging::init_logger(
        config.logging.dir.as_deref().unwrap_or(DEFAULT_LOG_DIR),
        config.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL),
    );
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { employee_id, image, overwrite, backend } => {
            let (config, path) = load(cli.config, backend).await?;
            init_file_logging(&config);
            info!(config = %path.display(), backend = %config.backend.kind, "Submitting document");

            if submit_cmd::run(&config, &employee_id, &image, overwrite.policy()).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Form { overwrite, backend } => {
            let (config, path) = load(cli.config, backend).await?;
            init_file_logging(&config);
            info!(config = %path.display(), backend = %config.backend.kind, "Starting interactive form");

            if let Err(e) = submit_cmd::run_interactive(&config, overwrite.policy()).await {
                note_error(&format!("{e:#}"));
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Validate { employee_id } => match validate_employee_id(&employee_id) {
            Ok(id) => note_success(&format!("{id} is a valid employee ID")),
            Err(_) => {
                note_error(ID_FORMAT_HINT);
                return Ok(ExitCode::FAILURE);
            }
        },
        Commands::Config { action } => {
            logging::init_console_logger(DEFAULT_LOG_LEVEL);
            let (config, path) = load(cli.config, None).await?;
            match action {
                ConfigAction::Show => config_cmd::show(&config, &path)?,
                ConfigAction::Check => {
                    if !config_cmd::check(&config) {
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
