//! JSON deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization of rule files.
//! They are converted to [`super::model::Rule`] via the loader.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw JSON representation of one rule record.
///
/// Every target field is optional here; the loader enforces that exactly
/// one of `fileName`, `structType` or `function` is set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDto {
    /// Import path of the package the rule targets.
    #[serde(default)]
    pub import_path: String,
    /// Dependency version range (`[start,end)`), empty for any.
    #[serde(default)]
    pub version: String,
    /// Compiler version range, empty for any.
    #[serde(default)]
    pub go_version: String,
    /// File to add to the package (file rules).
    #[serde(default)]
    pub file_name: String,
    /// Type to instrument (struct rules).
    #[serde(default)]
    pub struct_type: String,
    /// Function to instrument (func rules).
    #[serde(default)]
    pub function: String,
    /// Receiver type of `function`, e.g. `*DB`; empty for free functions.
    #[serde(default)]
    pub receiver_type: String,
    /// Everything else (hook names, field definitions, ...), passed through
    /// untouched to the rewriting step.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}
