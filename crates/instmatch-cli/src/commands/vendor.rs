//! Vendor command implementation.

use anyhow::{Context, Result};
use instmatch::{vendor, MatchConfig};
use std::path::Path;

use crate::OutputFormat;

/// Runs the vendor command.
pub fn run(dir: &Path, config: &MatchConfig, format: OutputFormat) -> Result<()> {
    let manifest = config.manifest_path(dir);
    let modules = vendor::resolve(&manifest)
        .with_context(|| format!("Failed to resolve {}", manifest.display()))?;
    super::output::print_modules(&modules, format)
}
