//! # instmatch
//!
//! Instrumentation rule matching for Go builds.
//!
//! For every package about to be compiled, instmatch selects the rules
//! registered for its import path, filters them by dependency and compiler
//! version, and locates the file, type or function each rule targets. The
//! result is one [`RuleBundle`] per package, ready for the rewriting step.
//!
//! ## Programmatic Usage
//!
//! ```rust,ignore
//! use instmatch::{Dispatcher, MatchConfig};
//!
//! let config = MatchConfig::from_file("instmatch.toml".as_ref())?;
//! let dispatcher = Dispatcher::from_config(&config, ".".as_ref())?;
//! let bundles = dispatcher.dispatch_commands(lines).await?;
//! ```

#![forbid(unsafe_code)]

mod dispatcher;
mod error;
mod matcher;

pub use dispatcher::Dispatcher;
pub use error::MatchError;
pub use matcher::UnitMatcher;

// Re-export core types
pub use instmatch_core::*;

/// Go source inspection.
pub mod go {
    pub use instmatch_go::*;
}
