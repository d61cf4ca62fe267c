//! Errors that stop a matching run.

use std::time::Duration;

use instmatch_core::{ConfigError, LoadRulesError, UnitError, VendorError};
use thiserror::Error;

/// Fatal errors from setting up or running a dispatch.
///
/// Per-file and per-comparison failures are not represented here; they are
/// logged and the affected file or rule is skipped.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rule source failed to load.
    #[error("Rule error: {0}")]
    Rules(#[from] LoadRulesError),

    /// The vendor manifest is missing or unreadable.
    #[error("Vendor error: {0}")]
    Vendor(#[from] VendorError),

    /// A compile command could not be interpreted.
    #[error("Invalid compile command: {0}")]
    Unit(#[from] UnitError),

    /// The whole dispatch exceeded its time limit.
    #[error("Matching did not finish within {0:?}")]
    Timeout(Duration),
}
