//! instmatch CLI tool.
//!
//! Usage:
//! ```bash
//! instmatch match --log build.log [--vendor] [--format json]
//! instmatch list-rules
//! instmatch check-version v1.5.2 "[1.0.0,2.0.0)"
//! instmatch vendor [DIR]
//! instmatch init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Decides which instrumentation rules apply to each package of a Go build
#[derive(Parser)]
#[command(name = "instmatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory (config, relative rule files, vendor manifest)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match rules against compile commands
    Match(commands::match_cmd::MatchArgs),

    /// List the rules the configuration makes available
    ListRules {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Check whether a version falls inside a range
    CheckVersion {
        /// Version, e.g. `v1.5.2` or `1.22`
        version: String,

        /// Half-open range, e.g. `[1.0.0,2.0.0)`
        range: String,
    },

    /// Show the modules recorded in a vendor manifest
    Vendor {
        /// Project directory holding `vendor/modules.txt`
        /// (default: the project directory)
        dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One line per entry.
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config_resolver::load(&cli.project, cli.config.as_deref())?;
    config.verbose |= cli.verbose;

    let filter = if config.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Match(args) => commands::match_cmd::run(args, config, &cli.project).await,
        Commands::ListRules { format } => commands::list_rules::run(&config, &cli.project, format),
        Commands::CheckVersion { version, range } => commands::check_version::run(&version, &range),
        Commands::Vendor { dir, format } => {
            commands::vendor::run(dir.as_deref().unwrap_or(&cli.project), &config, format)
        }
        Commands::Init { force } => commands::init::run(&cli.project, force),
    }
}
