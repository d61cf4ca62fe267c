//! # instmatch-go
//!
//! Tree-sitter powered Go source inspection for instmatch.
//!
//! This crate turns Go source files into the small intermediate form the
//! matcher needs, and matches rule targets against it:
//!
//! - [`SourceParser`] trait for pluggable parsing
//! - [`GoParser`] for package clause and top-level declaration extraction
//! - [`SourceCache`] for per-unit, parse-once file access
//! - [`find_match`] for locating the declaration a rule targets

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod extractor;
pub mod go;
pub mod syntax;

pub use cache::SourceCache;
pub use extractor::{DeclKind, Declaration, ParseError, SourceFile, SourceParser};
pub use go::GoParser;
pub use syntax::{find_match, matches_declaration};
