//! walkcheck CLI tool.
//!
//! Usage:
//! ```bash
//! walkcheck check [OPTIONS] [PATH]
//! walkcheck list-checks
//! walkcheck init
//! walkcheck dump FILE
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use walkcheck::Severity;

mod commands;
mod config_resolver;

/// Tree-walking style checker for parsed syntax trees
#[derive(Parser)]
#[command(name = "walkcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "WALKCHECK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run checks over a directory of tree dumps
    Check {
        /// Path to audit (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific checks (comma-separated names or ids)
        #[arg(long)]
        checks: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Number of worker threads
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Lowest severity that fails the run
        #[arg(long)]
        fail_on: Option<Severity>,
    },

    /// List available checks
    ListChecks,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Parse a tree dump and print it back in canonical form
    Dump {
        /// File to parse
        file: PathBuf,
    },
}

/// Output format for audit results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-diagnostic compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            checks,
            exclude,
            jobs,
            fail_on,
        } => {
            let source = config_resolver::resolve(&path, cli.config.as_deref());
            let options = commands::check::CheckOptions {
                format,
                checks,
                exclude,
                jobs,
                fail_on,
            };
            commands::check::run(&path, &options, &source)
        }
        Commands::ListChecks => {
            commands::list_checks::run(cli.verbose);
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
        Commands::Dump { file } => commands::dump::run(&file),
    }
}
