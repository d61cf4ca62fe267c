//! List rules command implementation.

use anyhow::{Context, Result};
use instmatch::MatchConfig;
use std::path::Path;

use crate::OutputFormat;

/// Runs the list-rules command.
pub fn run(config: &MatchConfig, project: &Path, format: OutputFormat) -> Result<()> {
    let repo = config
        .build_repository(project)
        .context("Failed to load rules")?;
    super::output::print_rules(&repo, format)
}
