//! Subcommand implementations.

pub mod check_version;
pub mod init;
pub mod list_rules;
pub mod match_cmd;
pub mod output;
pub mod vendor;
