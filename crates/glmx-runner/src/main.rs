//! `glmx` - authoring tools for the GLM explainer site.

use clap::{Parser, Subcommand};
use glmx_pages::WriteMode;
use glmx_runner::commands::{self, enforce_strict};
use glmx_runner::{init_logging, CliError, Config, ValidateTarget};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "glmx")]
#[command(about = "Authoring tools for the GLM explainer site")]
#[command(version)]
struct Cli {
    /// YAML config file (default: ./glmx.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch Arthur's Seat elevations from the Open-Meteo API
    FetchElevation,

    /// Generate synthetic Arthur's Seat elevations
    GenerateElevation,

    /// Add index and next-tutorial links to the tutorial pages
    AddNavigation {
        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Add the feedback widget script to tutorial pages and the index
    AddFeedback {
        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Add tap-to-select variable picking to the systematic pages
    AddMobilePicker {
        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Replace inline styles in prototype pages with shared CSS links
    ExtractCss {
        /// Report changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Refit tutorial models and compare with the quoted coefficients
    Validate {
        /// Tutorial to validate
        #[arg(value_enum, default_value_t = ValidateTarget::All)]
        target: ValidateTarget,

        /// Exit with status 1 if any coefficient does not match
        #[arg(long)]
        strict: bool,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::FetchElevation => {
            commands::fetch_elevation(&config, &mut out)?;
        }
        Commands::GenerateElevation => {
            commands::generate_elevation(&config, &mut out)?;
        }
        Commands::AddNavigation { dry_run } => {
            commands::add_navigation(&config, WriteMode::from_dry_run(dry_run), &mut out)?;
        }
        Commands::AddFeedback { dry_run } => {
            commands::add_feedback(&config, WriteMode::from_dry_run(dry_run), &mut out)?;
        }
        Commands::AddMobilePicker { dry_run } => {
            commands::add_mobile_picker(&config, WriteMode::from_dry_run(dry_run), &mut out)?;
        }
        Commands::ExtractCss { dry_run } => {
            commands::extract_css(&config, WriteMode::from_dry_run(dry_run), &mut out)?;
        }
        Commands::Validate { target, strict, json } => {
            let reports = commands::validate(&config, target, json, &mut out)?;
            enforce_strict(&reports, strict)?;
        }
    }

    out.flush().map_err(CliError::Output)?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
