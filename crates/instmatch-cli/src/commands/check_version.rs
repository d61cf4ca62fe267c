//! Check-version command implementation.

use anyhow::{Context, Result};
use instmatch::version;

/// Runs the check-version command.
pub fn run(version: &str, range: &str) -> Result<()> {
    let matched = version::matches(version, range)
        .with_context(|| format!("Cannot compare {version} against {range}"))?;

    if matched {
        println!("\x1b[32m{version} is in {range}\x1b[0m");
    } else {
        println!("\x1b[33m{version} is not in {range}\x1b[0m");
    }
    Ok(())
}
