//! Match command implementation.

use anyhow::{bail, Context, Result};
use instmatch::{compile_commands, CompileUnit, Dispatcher, MatchConfig};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::OutputFormat;

/// Arguments of the match command.
#[derive(Debug, clap::Args)]
pub struct MatchArgs {
    /// Dry-run build log to read compile commands from (`-` for stdin)
    #[arg(short, long, conflicts_with = "commands")]
    log: Option<PathBuf>,

    /// A single compile command line (can be specified multiple times)
    #[arg(long = "command", value_name = "LINE")]
    commands: Vec<String>,

    /// Resolve dependency versions from the vendor manifest
    #[arg(long)]
    vendor: bool,

    /// Additional JSON rule file (can be specified multiple times)
    #[arg(long = "rules", value_name = "FILE")]
    rule_files: Vec<PathBuf>,

    /// Disable every rule
    #[arg(long)]
    restore: bool,

    /// Abort if matching takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

/// Runs the match command.
pub async fn run(args: MatchArgs, mut config: MatchConfig, project: &Path) -> Result<()> {
    config.vendor.enabled |= args.vendor;
    config.restore |= args.restore;
    for file in &args.rule_files {
        let file = std::path::absolute(file)
            .with_context(|| format!("Invalid rule file path: {}", file.display()))?;
        config.rule_files.push(file);
    }

    let lines = read_commands(&args)?;
    let units = lines
        .iter()
        .map(|line| CompileUnit::from_command_line(line))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to read compile commands")?;

    let dispatcher =
        Dispatcher::from_config(&config, project).context("Failed to prepare matching")?;
    tracing::info!("Matching {} compile units", units.len());

    let bundles = match args.timeout {
        Some(secs) => {
            dispatcher
                .dispatch_with_timeout(units, Duration::from_secs(secs))
                .await?
        }
        None => dispatcher.dispatch(units).await,
    };

    super::output::print_bundles(&bundles, args.format)
}

fn read_commands(args: &MatchArgs) -> Result<Vec<String>> {
    let Some(log_path) = &args.log else {
        if args.commands.is_empty() {
            bail!("No compile commands given. Use --log FILE or --command LINE.");
        }
        return Ok(args.commands.clone());
    };

    let log = if log_path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read build log from stdin")?;
        buf
    } else {
        std::fs::read_to_string(log_path)
            .with_context(|| format!("Failed to read build log: {}", log_path.display()))?
    };
    Ok(compile_commands(&log))
}
