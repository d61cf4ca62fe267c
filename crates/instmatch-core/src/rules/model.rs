//! Validated rule model.
//!
//! A [`Rule`] always targets exactly one thing: a file to add to a package,
//! a type declaration, or a function declaration. Records with no target or
//! several targets are rejected by the loader and cannot be represented
//! here.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Fields shared by every rule kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBase {
    /// Import path of the targeted package.
    pub import_path: String,
    /// Dependency version range; empty matches any version.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Compiler version range; empty matches any compiler.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub go_version: String,
}

impl RuleBase {
    /// Creates a base with no version constraints.
    #[must_use]
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            version: String::new(),
            go_version: String::new(),
        }
    }

    /// Sets the dependency version range.
    #[must_use]
    pub fn with_version(mut self, range: impl Into<String>) -> Self {
        self.version = range.into();
        self
    }

    /// Sets the compiler version range.
    #[must_use]
    pub fn with_go_version(mut self, range: impl Into<String>) -> Self {
        self.go_version = range.into();
        self
    }
}

/// What a rule points at inside its package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuleTarget {
    /// Add a file to the package; only the package name is needed.
    File {
        /// Name of the file to add.
        #[serde(rename = "fileName")]
        file_name: String,
    },
    /// Instrument a named type declaration.
    Struct {
        /// Declared type name.
        #[serde(rename = "structType")]
        type_name: String,
    },
    /// Instrument a function or method declaration.
    Func {
        /// Function name.
        function: String,
        /// Receiver type (`DB`, `*DB`); empty for a free function.
        #[serde(rename = "receiverType", skip_serializing_if = "String::is_empty")]
        receiver_type: String,
    },
}

/// Discriminant of [`RuleTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleKind {
    /// [`RuleTarget::File`]
    File,
    /// [`RuleTarget::Struct`]
    Struct,
    /// [`RuleTarget::Func`]
    Func,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Struct => write!(f, "struct"),
            Self::Func => write!(f, "func"),
        }
    }
}

/// One instrumentation rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    #[serde(flatten)]
    base: RuleBase,
    #[serde(flatten)]
    target: RuleTarget,
    #[serde(skip_serializing_if = "Map::is_empty")]
    payload: Map<String, Value>,
}

impl Rule {
    /// Creates a rule with an empty payload.
    #[must_use]
    pub fn new(base: RuleBase, target: RuleTarget) -> Self {
        Self {
            base,
            target,
            payload: Map::new(),
        }
    }

    /// Shorthand for a file rule.
    #[must_use]
    pub fn file(base: RuleBase, file_name: impl Into<String>) -> Self {
        Self::new(
            base,
            RuleTarget::File {
                file_name: file_name.into(),
            },
        )
    }

    /// Shorthand for a struct rule.
    #[must_use]
    pub fn structure(base: RuleBase, type_name: impl Into<String>) -> Self {
        Self::new(
            base,
            RuleTarget::Struct {
                type_name: type_name.into(),
            },
        )
    }

    /// Shorthand for a func rule.
    #[must_use]
    pub fn func(
        base: RuleBase,
        function: impl Into<String>,
        receiver_type: impl Into<String>,
    ) -> Self {
        Self::new(
            base,
            RuleTarget::Func {
                function: function.into(),
                receiver_type: receiver_type.into(),
            },
        )
    }

    /// Attaches the opaque payload consumed by the rewriting step.
    #[must_use]
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Shared fields.
    #[must_use]
    pub fn base(&self) -> &RuleBase {
        &self.base
    }

    /// Targeted import path.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.base.import_path
    }

    /// Dependency version range expression.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.base.version
    }

    /// Compiler version range expression.
    #[must_use]
    pub fn go_version(&self) -> &str {
        &self.base.go_version
    }

    /// Declaration the rule targets.
    #[must_use]
    pub fn target(&self) -> &RuleTarget {
        &self.target
    }

    /// Kind of target.
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        match self.target {
            RuleTarget::File { .. } => RuleKind::File,
            RuleTarget::Struct { .. } => RuleKind::Struct,
            RuleTarget::Func { .. } => RuleKind::Func,
        }
    }

    /// Pass-through fields for the rewriting step.
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.import_path();
        match &self.target {
            RuleTarget::File { file_name } => write!(f, "file {path} +{file_name}")?,
            RuleTarget::Struct { type_name } => write!(f, "struct {path}.{type_name}")?,
            RuleTarget::Func {
                function,
                receiver_type,
            } if receiver_type.is_empty() => write!(f, "func {path}.{function}")?,
            RuleTarget::Func {
                function,
                receiver_type,
            } => write!(f, "func {path}.({receiver_type}).{function}")?,
        }
        if !self.version().is_empty() {
            write!(f, " {}", self.version())?;
        }
        if !self.go_version().is_empty() {
            write!(f, " go{}", self.go_version())?;
        }
        Ok(())
    }
}
