//! Instrumentation rules and their JSON decoding.
//!
//! # Architecture
//!
//! ```text
//! JSON text
//!   ↓ serde (DTO layer)
//! dto::RuleDto
//!   ↓ validate + convert
//! model::Rule (exactly one target)
//! ```

use std::path::{Path, PathBuf};

pub mod dto;
pub mod loader;
pub mod model;

pub use model::{Rule, RuleBase, RuleKind, RuleTarget};

/// Built-in rule set shipped with the binary.
const DEFAULT_RULES: &str = include_str!("../../rules/default.json");

/// Errors from decoding and loading a rule set.
#[derive(Debug, thiserror::Error)]
pub enum LoadRulesError {
    /// Rule file could not be read.
    #[error("failed to read rule file {path}: {source}")]
    Io {
        /// Rule file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// JSON deserialization failed.
    #[error("invalid rule JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A record failed validation.
    #[error("{0}")]
    Load(#[from] loader::LoadError),
}

/// Decodes a JSON array of rule records.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or any record is malformed.
pub fn load_rules_from_json(content: &str) -> Result<Vec<Rule>, LoadRulesError> {
    let dtos: Vec<dto::RuleDto> = serde_json::from_str(content)?;
    Ok(loader::load(dtos)?)
}

/// Reads and decodes a rule file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn load_rules_from_file(path: &Path) -> Result<Vec<Rule>, LoadRulesError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadRulesError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_rules_from_json(&content)
}

/// Decodes the built-in rule set.
///
/// # Errors
///
/// Returns an error only if the embedded JSON is broken.
pub fn default_rules() -> Result<Vec<Rule>, LoadRulesError> {
    load_rules_from_json(DEFAULT_RULES)
}
