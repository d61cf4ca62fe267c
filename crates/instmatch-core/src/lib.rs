//! # instmatch-core
//!
//! Core types for deciding which instrumentation rules apply to a Go
//! compile unit.
//!
//! This crate holds everything that does not need a Go parser:
//!
//! - [`version`] for Go-flavoured semantic versions and half-open ranges
//! - [`vendor`] for reading `vendor/modules.txt`
//! - [`rules`] for the rule model and its JSON form
//! - [`RuleRepository`] for the import-path index over all rules
//! - [`RuleBundle`] for per-package match results
//! - [`CompileUnit`] for compiler command lines
//! - [`MatchConfig`] for TOML configuration
//!
//! ## Example
//!
//! ```ignore
//! use instmatch_core::{MatchConfig, CompileUnit};
//!
//! let config = MatchConfig::from_file("instmatch.toml".as_ref())?;
//! let repo = config.build_repository(".".as_ref())?;
//! let unit = CompileUnit::from_command_line(line)?;
//! for rule in repo.rules_for(unit.import_path()) {
//!     println!("{rule}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bundle;
mod config;
mod repository;
mod unit;

pub mod rules;
pub mod vendor;
pub mod version;

pub use bundle::RuleBundle;
pub use config::{ConfigError, MatchConfig, VendorConfig};
pub use repository::{RuleId, RuleRepository};
pub use rules::{LoadRulesError, Rule, RuleBase, RuleKind, RuleTarget};
pub use unit::{
    compile_commands, find_flag_value, split_command_line, CompileUnit, UnitError,
    COMPILER_VERSION_FLAG, IMPORT_PATH_FLAG, SOURCE_EXTENSION,
};
pub use vendor::{VendorError, VendorModule};
pub use version::{VersionError, VersionRange};
