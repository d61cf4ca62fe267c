//! Locating and loading `instmatch.toml`.
//!
//! An explicit `--config` path must exist. Otherwise the first of
//! `{project}/instmatch.toml`, `{project}/.instmatch.toml` and
//! `{global}/config.toml` that exists is used, and the built-in defaults
//! apply when there is none.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use instmatch::MatchConfig;

const PROJECT_CONFIG_NAMES: [&str; 2] = ["instmatch.toml", ".instmatch.toml"];

/// Loads the configuration for `project_dir`.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<MatchConfig> {
    load_from(project_dir, explicit, global_config_dir())
}

fn load_from(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> Result<MatchConfig> {
    let found = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| project_dir.join(name))
            .chain(global_dir.map(|dir| dir.join("config.toml")))
            .find(|candidate| candidate.exists()),
    };

    let Some(path) = found else {
        tracing::debug!("No config for {}, using defaults", project_dir.display());
        return Ok(MatchConfig::default());
    };
    tracing::debug!("Loading config from {}", path.display());
    MatchConfig::from_file(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// `$INSTMATCH_CONFIG_DIR`, falling back to `~/.instmatch`.
fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os("INSTMATCH_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".instmatch")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn project_config_shadows_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "restore = true\n").unwrap();

        let config = load_from(project.path(), None, Some(global.path().into())).unwrap();
        assert!(config.restore);

        fs::write(project.path().join(".instmatch.toml"), "[vendor]\nenabled = true\n").unwrap();
        let config = load_from(project.path(), None, Some(global.path().into())).unwrap();
        assert!(!config.restore);
        assert!(config.vendor.enabled);
    }

    #[test]
    fn explicit_path_must_exist() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("instmatch.toml"), "restore = true\n").unwrap();
        let missing = project.path().join("missing.toml");
        assert!(load_from(project.path(), Some(&missing), None).is_err());
    }

    #[test]
    fn defaults_without_any_config() {
        let project = TempDir::new().unwrap();
        let config = load_from(project.path(), None, None).unwrap();
        assert!(!config.restore);
        assert!(!config.disable_default);
    }
}
