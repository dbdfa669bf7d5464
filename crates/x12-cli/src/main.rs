//! # x12 CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads the
//! optional config file, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use x12_cli::config::CliConfig;
use x12_cli::generate::{run_generate, GenerateArgs};
use x12_cli::inspect::{run_inspect, InspectArgs};
use x12_cli::validate::{run_validate, ValidateArgs};

/// X12 envelope engine CLI
///
/// Validates, inspects and generates ISA/GS/ST enveloped documents.
#[derive(Parser, Debug)]
#[command(name = "x12", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate documents and report every problem found.
    Validate(ValidateArgs),

    /// Print the envelope outline of a document.
    Inspect(InspectArgs),

    /// Build an envelope from a YAML composition file.
    Generate(GenerateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "x12 CLI starting");

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &config),
        Commands::Inspect(args) => run_inspect(&args, &config),
        Commands::Generate(args) => run_generate(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
