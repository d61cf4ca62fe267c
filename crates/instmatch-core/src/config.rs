//! Configuration types for instmatch.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::repository::RuleRepository;
use crate::rules::{self, LoadRulesError, Rule};
use crate::vendor::MANIFEST_PATH;

/// Top-level configuration for a matching run.
///
/// Everything that gates which rules are available lives here and is
/// passed explicitly to the dispatcher; nothing is read from process-wide
/// switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatchConfig {
    /// Log every matching decision.
    #[serde(default)]
    pub verbose: bool,

    /// Disable all rules, so that a rebuild undoes earlier instrumentation.
    #[serde(default)]
    pub restore: bool,

    /// Skip the built-in rule set.
    #[serde(default)]
    pub disable_default: bool,

    /// External JSON rule files, loaded after the built-in set.
    #[serde(default)]
    pub rule_files: Vec<PathBuf>,

    /// Glob patterns over import paths whose rules are dropped
    /// (e.g. `"database/sql"`, `"github.com/go-redis/*"`).
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Vendor mode settings.
    #[serde(default)]
    pub vendor: VendorConfig,
}

/// Vendor mode configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorConfig {
    /// Resolve dependency versions from the vendor manifest.
    #[serde(default)]
    pub enabled: bool,

    /// Manifest path, relative to the project directory.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            manifest: default_manifest(),
        }
    }
}

fn default_manifest() -> PathBuf {
    PathBuf::from(MANIFEST_PATH)
}

impl MatchConfig {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Returns `true` if rules for `import_path` are switched off.
    #[must_use]
    pub fn is_disabled(&self, import_path: &str) -> bool {
        self.disabled.iter().any(|pattern| {
            pattern == import_path
                || glob::Pattern::new(pattern).is_ok_and(|p| p.matches(import_path))
        })
    }

    /// Manifest location for a project rooted at `project_dir`.
    #[must_use]
    pub fn manifest_path(&self, project_dir: &Path) -> PathBuf {
        if self.vendor.manifest.is_absolute() {
            self.vendor.manifest.clone()
        } else {
            project_dir.join(&self.vendor.manifest)
        }
    }

    /// Builds the rule repository this configuration describes.
    ///
    /// Relative rule file paths are resolved against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns the first rule source that fails to load. A malformed rule
    /// anywhere aborts the build.
    pub fn build_repository(&self, base_dir: &Path) -> Result<RuleRepository, LoadRulesError> {
        if self.restore {
            info!("Restore mode: all rules disabled");
            return Ok(RuleRepository::new());
        }

        let mut sources: Vec<Vec<Rule>> = Vec::new();
        if !self.disable_default {
            sources.push(rules::default_rules()?);
        }
        for file in &self.rule_files {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };
            debug!("Loading rules from {}", path.display());
            sources.push(rules::load_rules_from_file(&path)?);
        }

        let repo = RuleRepository::build(sources.into_iter().map(|source| {
            source
                .into_iter()
                .filter(|rule| !self.is_disabled(rule.import_path()))
        }));
        info!(
            "Loaded {} rules for {} import paths",
            repo.len(),
            repo.import_path_count()
        );
        Ok(repo)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
