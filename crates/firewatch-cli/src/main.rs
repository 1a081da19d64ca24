//! Firewatch CLI - run and inspect sensor network fire scenarios.

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "firewatch")]
#[command(author, version, about = "Firewatch - mobile sensor agents versus a spreading fire", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default scenario file
    Init {
        /// Scenario file to create (default: ./firewatch.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run a scenario
    Run {
        /// Scenario file (default: nearest firewatch.toml, else built-in)
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Wall-clock duration in seconds
        #[arg(short, long, default_value = "30")]
        duration: u64,

        /// Speed factor dividing the agent cycle pause
        #[arg(long)]
        speed: Option<u32>,

        /// Seed for the fire-spread RNG
        #[arg(long)]
        seed: Option<u64>,

        /// Write the agent event log as JSON
        #[arg(short, long)]
        events_out: Option<PathBuf>,
    },

    /// Check a scenario file and describe its topology
    Validate {
        /// Scenario file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Run {
            scenario,
            duration,
            speed,
            seed,
            events_out,
        } => commands::run::run(commands::run::RunOptions {
            scenario,
            duration,
            speed,
            seed,
            events_out,
        }),
        Commands::Validate { file } => commands::validate::run(&file),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the level chosen here.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
