//! Half-open semantic version ranges.
//!
//! Rules scope themselves to a window of dependency (or compiler) versions
//! written as `[start,end)`. Either bound may be omitted:
//!
//! | Expression        | Matches                    |
//! |-------------------|----------------------------|
//! | `""`              | every version              |
//! | `[1.0.0,2.0.0)`   | `1.0.0 <= v < 2.0.0`       |
//! | `[,2.0.0)`        | `v < 2.0.0`                |
//! | `[1.0.0,)`        | `v >= 1.0.0`               |
//!
//! Versions may carry a leading `v` (`v1.5.2`) or not (`1.5.2`). The
//! shorthands `v1` and `v1.22` are read as `v1.0.0` and `v1.22.0`, which is
//! how compiler language versions (`go1.22`) are compared.

use semver::{BuildMetadata, Version};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// Errors raised while evaluating a version comparison.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The version being tested is not a semantic version.
    #[error("invalid version `{version}`")]
    InvalidVersion {
        /// The rejected version string.
        version: String,
    },

    /// The rule's range expression is malformed.
    #[error("invalid rule version range `{range}`: {reason}")]
    InvalidRange {
        /// The rejected range expression.
        range: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Parses a version string, accepting an optional `v` prefix and the
/// `major` / `major.minor` shorthands.
///
/// Build metadata is dropped, so `v2.0.0+incompatible` compares equal to
/// `v2.0.0`.
///
/// # Errors
///
/// Returns [`VersionError::InvalidVersion`] if the string is not a
/// semantic version.
pub fn parse_version(raw: &str) -> Result<Version, VersionError> {
    let invalid = || VersionError::InvalidVersion {
        version: raw.to_string(),
    };

    let trimmed = raw.trim();
    let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
    if bare.is_empty() {
        return Err(invalid());
    }

    let has_suffix = bare.contains(['-', '+']);
    let padded = match bare.matches('.').count() {
        0 if !has_suffix => format!("{bare}.0.0"),
        1 if !has_suffix => format!("{bare}.0"),
        _ => bare.to_string(),
    };

    let mut version = Version::parse(&padded).map_err(|_| invalid())?;
    version.build = BuildMetadata::EMPTY;
    Ok(version)
}

/// A half-open interval `[start, end)` over semantic versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    start: Option<Version>,
    end: Option<Version>,
}

impl VersionRange {
    /// Parses a `[start,end)` expression. Whitespace is ignored.
    ///
    /// A range whose start lies above its end is accepted; it simply never
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidRange`] when the brackets or comma are
    /// missing, both bounds are omitted, or a bound is not a version.
    pub fn parse(expr: &str) -> Result<Self, VersionError> {
        let invalid = |reason| VersionError::InvalidRange {
            range: expr.to_string(),
            reason,
        };

        let compact: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
        let inner = compact
            .strip_prefix('[')
            .ok_or_else(|| invalid("expected opening `[`"))?
            .strip_suffix(')')
            .ok_or_else(|| invalid("expected closing `)`"))?;
        let (start, end) = inner
            .split_once(',')
            .ok_or_else(|| invalid("expected `,` between bounds"))?;

        if start.is_empty() && end.is_empty() {
            return Err(invalid("at least one bound is required"));
        }

        let bound = |s: &str| -> Result<Option<Version>, VersionError> {
            if s.is_empty() {
                Ok(None)
            } else {
                parse_version(s)
                    .map(Some)
                    .map_err(|_| invalid("bound is not a semantic version"))
            }
        };

        Ok(Self {
            start: bound(start)?,
            end: bound(end)?,
        })
    }

    /// Returns `true` if `version` lies inside the range.
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        let above_start = self.start.as_ref().map_or(true, |s| version >= s);
        let below_end = self.end.as_ref().map_or(true, |e| version < e);
        above_start && below_end
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<&Version>| v.map(ToString::to_string).unwrap_or_default();
        write!(f, "[{},{})", show(self.start.as_ref()), show(self.end.as_ref()))
    }
}

/// Checks whether `version` falls inside `range_expr`.
///
/// An empty range expression matches everything without inspecting
/// `version`.
///
/// # Errors
///
/// Returns an error if `version` is not a semantic version or the range is
/// malformed. Callers treat this as "rule not applicable" for that
/// comparison only.
pub fn matches(version: &str, range_expr: &str) -> Result<bool, VersionError> {
    if range_expr.trim().is_empty() {
        return Ok(true);
    }
    let version = parse_version(version)?;
    let range = VersionRange::parse(range_expr)?;
    Ok(range.contains(&version))
}

static MODULE_CACHE_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"@v\d+\.\d+\.\d+(-.*?)?/").ok());

/// Extracts a module version embedded in a module-cache path such as
/// `/go/pkg/mod/github.com/gin-gonic/gin@v1.9.1/gin.go`.
///
/// Returns `None` for paths outside the module cache (standard library,
/// the main module, vendored packages).
#[must_use]
pub fn extract_path_version(path: &Path) -> Option<String> {
    let unified = path.to_string_lossy().replace('\\', "/");
    let found = MODULE_CACHE_VERSION.as_ref()?.find(&unified)?;
    let text = found.as_str();
    Some(text[1..text.len() - 1].to_string())
}

/// Normalizes a compiler language flag value (`go1.22`) to a version
/// string (`v1.22`).
#[must_use]
pub fn normalize_compiler_version(raw: &str) -> String {
    match raw.strip_prefix("go") {
        Some(rest) => format!("v{rest}"),
        None => raw.to_string(),
    }
}
