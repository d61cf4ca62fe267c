//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# instmatch configuration

# Log every matching decision
verbose = false

# Disable all rules (rebuild without instrumentation)
restore = false

# Skip the built-in rule set
disable-default = false

# Extra JSON rule files, relative to this directory
rule-files = [
    # "rules/custom.json",
]

# Import paths whose rules are switched off (glob patterns)
disabled = [
    # "github.com/go-redis/*",
]

[vendor]
# Resolve dependency versions from the vendor manifest
enabled = false
manifest = "vendor/modules.txt"
"#;

/// Config file written by the init command.
const CONFIG_NAME: &str = "instmatch.toml";

/// Runs the init command.
pub fn run(project: &Path, force: bool) -> Result<()> {
    let config_path = project.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to select rules");
    println!("  2. Run: go build -a -n ./... 2> build.log");
    println!("  3. Run: instmatch match --log build.log");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use instmatch::MatchConfig;

    #[test]
    fn default_config_parses() {
        let config = MatchConfig::parse(DEFAULT_CONFIG).unwrap();
        assert!(!config.restore);
        assert!(config.rule_files.is_empty());
        assert!(!config.vendor.enabled);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        run(tmp.path(), false).unwrap();
        assert!(run(tmp.path(), false).is_err());
        run(tmp.path(), true).unwrap();
    }
}
