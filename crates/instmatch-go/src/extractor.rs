//! Language-agnostic extraction types and trait.
//!
//! `SourceParser` is the seam between the matcher and the syntax tree
//! library. Implement it to hand the matcher a package name and a flat
//! list of top-level declarations for one source file.

use std::path::PathBuf;

/// Kind of top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `type Foo struct{}`, `type Foo = Bar`
    Type,
    /// `func Foo()`, `func (r *T) Foo()`
    Func,
}

/// A top-level declaration extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Line number (1-indexed).
    pub line: usize,
    /// Declared identifier.
    pub name: String,
    /// Kind of declaration.
    pub kind: DeclKind,
    /// Receiver type of a method (`T`, `*T`), type arguments stripped.
    /// Empty for free functions and types.
    pub receiver: String,
}

impl Declaration {
    /// Creates a type declaration.
    #[must_use]
    pub fn type_decl(line: usize, name: impl Into<String>) -> Self {
        Self {
            line,
            name: name.into(),
            kind: DeclKind::Type,
            receiver: String::new(),
        }
    }

    /// Creates a function or method declaration.
    #[must_use]
    pub fn func_decl(line: usize, name: impl Into<String>, receiver: impl Into<String>) -> Self {
        Self {
            line,
            name: name.into(),
            kind: DeclKind::Func,
            receiver: receiver.into(),
        }
    }
}

/// Result of a full parse of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Package name from the package clause.
    pub package: String,
    /// Top-level declarations in source order.
    pub declarations: Vec<Declaration>,
}

/// Errors from reading or parsing one source file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Source file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The grammar could not be loaded into the parser.
    #[error("incompatible grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    /// The parser produced no tree.
    #[error("parser produced no syntax tree")]
    NoTree,

    /// The source has a syntax error.
    #[error("syntax error at {line}:{column}")]
    Syntax {
        /// Line number (1-indexed).
        line: usize,
        /// Column (0-indexed byte offset within line).
        column: usize,
    },

    /// The source has no package clause.
    #[error("missing package clause")]
    MissingPackage,
}

/// Trait for language-specific source extraction.
///
/// Parsers are shared across matching tasks, so implementations must not
/// hold per-parse state.
pub trait SourceParser: Send + Sync {
    /// Reads only the package name. Errors after the package clause are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no readable package clause.
    fn parse_package(&self, source: &str) -> Result<String, ParseError>;

    /// Parses the package name and all top-level declarations.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse cleanly.
    fn parse_file(&self, source: &str) -> Result<SourceFile, ParseError>;
}
