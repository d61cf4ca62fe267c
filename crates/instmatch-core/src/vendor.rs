//! Vendor manifest (`vendor/modules.txt`) resolution.
//!
//! In vendor mode the module cache is not used, so source paths carry no
//! `@vX.Y.Z` marker. The manifest is the only record of which module
//! version was selected:
//!
//! ```text
//! # golang.org/x/text v0.21.0
//! ## explicit; go 1.18
//! golang.org/x/text/secure/bidirule
//! golang.org/x/text/transform
//! # golang.org/x/time v0.5.0
//! ## explicit; go 1.18
//! golang.org/x/time/rate
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::version::parse_version;

/// Manifest location relative to the module root.
pub const MANIFEST_PATH: &str = "vendor/modules.txt";

/// Errors from reading a vendor manifest.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// The manifest does not exist.
    #[error("vendor manifest not found: {path}")]
    NotFound {
        /// Expected manifest location.
        path: PathBuf,
    },

    /// The manifest exists but could not be scanned to the end.
    #[error("cannot parse vendor manifest {path}: {source}")]
    Parse {
        /// Manifest location.
        path: PathBuf,
        /// Underlying read error.
        source: std::io::Error,
    },
}

/// One module recorded in the manifest, with the packages it provides.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VendorModule {
    /// Module path (e.g. `golang.org/x/text`).
    pub path: String,
    /// Selected version; empty for wildcard replacements.
    pub version: String,
    /// Packages of this module used by the build, in manifest order.
    pub submodules: Vec<String>,
}

impl VendorModule {
    fn new(path: &str, version: &str) -> Self {
        Self {
            path: path.to_string(),
            version: version.to_string(),
            submodules: Vec::new(),
        }
    }

    fn provides(&self, import_path: &str) -> bool {
        self.submodules.iter().any(|s| s == import_path)
    }
}

/// Reads and parses the manifest at `manifest_path`.
///
/// # Errors
///
/// Returns [`VendorError::NotFound`] if the file is absent and
/// [`VendorError::Parse`] if it cannot be read.
pub fn resolve(manifest_path: &Path) -> Result<Vec<VendorModule>, VendorError> {
    if !manifest_path.exists() {
        return Err(VendorError::NotFound {
            path: manifest_path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(manifest_path).map_err(|e| VendorError::Parse {
        path: manifest_path.to_path_buf(),
        source: e,
    })?;
    // Stray non-UTF-8 bytes only spoil the line they appear on.
    let modules = parse_manifest(&String::from_utf8_lossy(&bytes));
    debug!(
        "Resolved {} vendor modules from {}",
        modules.len(),
        manifest_path.display()
    );
    Ok(modules)
}

/// Reads `<project_dir>/vendor/modules.txt`.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_project(project_dir: &Path) -> Result<Vec<VendorModule>, VendorError> {
    resolve(&project_dir.join(MANIFEST_PATH))
}

/// Parses manifest text into the modules that provide at least one package.
///
/// When a module path appears more than once, only the highest version is
/// kept, at the position where the path was first seen.
#[must_use]
pub fn parse_manifest(content: &str) -> Vec<VendorModule> {
    let mut modules: Vec<VendorModule> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    // Module whose packages are being listed. `None` before the first
    // header and after a header that cannot be interpreted.
    let mut current: Option<VendorModule> = None;

    let mut flush = |module: Option<VendorModule>| {
        let Some(module) = module.filter(|m| !m.submodules.is_empty()) else {
            return;
        };
        match index.get(&module.path) {
            Some(&i) => {
                if version_less(&modules[i].version, &module.version) {
                    modules[i] = module;
                }
            }
            None => {
                index.insert(module.path.clone(), modules.len());
                modules.push(module);
            }
        }
    };

    for line in content.lines() {
        if let Some(header) = line.strip_prefix("# ") {
            let fields: Vec<&str> = header.split_whitespace().collect();
            if fields.len() < 2 {
                continue;
            }
            flush(current.take());
            current = if fields[1] == "=>" {
                // Wildcard replacement from the main module's go.mod.
                Some(VendorModule::new(fields[0], ""))
            } else if parse_version(fields[1]).is_ok() && fields[1].starts_with('v') {
                Some(VendorModule::new(fields[0], fields[1]))
            } else {
                None
            };
            continue;
        }

        let Some(module) = current.as_mut() else {
            continue;
        };

        if line.starts_with("## ") {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if let [package] = fields.as_slice() {
            if is_import_path(package) {
                module.submodules.push((*package).to_string());
            }
        }
    }
    flush(current.take());

    modules
}

/// Looks up the version selected for `import_path`.
///
/// An exact module path match wins; otherwise the module providing
/// `import_path` as a package is used. Returns `None` if unresolved, in
/// which case callers fall back to the version embedded in source paths.
#[must_use]
pub fn version_of<'a>(modules: &'a [VendorModule], import_path: &str) -> Option<&'a str> {
    modules
        .iter()
        .find(|m| m.path == import_path)
        .or_else(|| modules.iter().find(|m| m.provides(import_path)))
        .map(|m| m.version.as_str())
        .filter(|v| !v.is_empty())
}

/// Orders versions, treating unparsable ones (including the empty wildcard
/// version) as lower than any valid version.
fn version_less(a: &str, b: &str) -> bool {
    match (parse_version(a), parse_version(b)) {
        (Ok(a), Ok(b)) => a < b,
        (Err(_), Ok(_)) => true,
        _ => false,
    }
}

/// Checks that `path` is a syntactically valid import path: slash-separated
/// non-empty elements made of letters, digits and `-._~+`, none starting or
/// ending with a dot.
#[must_use]
pub fn is_import_path(path: &str) -> bool {
    if path.is_empty() || path.starts_with('-') {
        return false;
    }
    path.split('/').all(|elem| {
        !elem.is_empty()
            && !elem.starts_with('.')
            && !elem.ends_with('.')
            && elem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-._~+".contains(c))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
# golang.org/x/text v0.21.0
## explicit; go 1.18
golang.org/x/text/secure/bidirule
golang.org/x/text/transform
golang.org/x/text/unicode/bidi
# golang.org/x/time v0.5.0
## explicit; go 1.18
golang.org/x/time/rate
";

    #[test]
    fn parses_modules_and_packages() {
        let modules = parse_manifest(MANIFEST);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].path, "golang.org/x/text");
        assert_eq!(modules[0].version, "v0.21.0");
        assert_eq!(
            modules[0].submodules,
            vec![
                "golang.org/x/text/secure/bidirule",
                "golang.org/x/text/transform",
                "golang.org/x/text/unicode/bidi",
            ]
        );
        assert_eq!(modules[1].submodules, vec!["golang.org/x/time/rate"]);
    }

    #[test]
    fn submodule_resolves_to_owning_module() {
        let modules = parse_manifest(MANIFEST);
        assert_eq!(
            version_of(&modules, "golang.org/x/text/transform"),
            Some("v0.21.0")
        );
        assert_eq!(version_of(&modules, "golang.org/x/time/rate"), Some("v0.5.0"));
    }

    #[test]
    fn exact_module_path_wins() {
        let manifest = "\
# example.com/a v1.0.0
example.com/b
# example.com/b v2.0.0
example.com/b
";
        let modules = parse_manifest(manifest);
        assert_eq!(version_of(&modules, "example.com/b"), Some("v2.0.0"));
    }

    #[test]
    fn unresolved_path_is_none() {
        let modules = parse_manifest(MANIFEST);
        assert_eq!(version_of(&modules, "github.com/gin-gonic/gin"), None);
    }

    #[test]
    fn duplicate_module_keeps_highest_version() {
        let manifest = "\
# github.com/redis/go-redis/v9 v9.0.5
github.com/redis/go-redis/v9
# github.com/redis/go-redis/v9 v9.5.1
github.com/redis/go-redis/v9
# github.com/redis/go-redis/v9 v9.1.0
github.com/redis/go-redis/v9
";
        let modules = parse_manifest(manifest);
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].version, "v9.5.1");
        assert_eq!(
            version_of(&modules, "github.com/redis/go-redis/v9"),
            Some("v9.5.1")
        );
    }

    #[test]
    fn stray_lines_before_first_header_are_ignored() {
        let manifest = "\
example.com/orphan
## explicit
# example.com/real v1.2.3
example.com/real/pkg
";
        let modules = parse_manifest(manifest);
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].submodules, vec!["example.com/real/pkg"]);
    }

    #[test]
    fn unusable_header_disables_collection() {
        let manifest = "\
# example.com/good v1.0.0
example.com/good/a
# example.com/weird notaversion
example.com/weird/pkg
# example.com/next v0.1.0
example.com/next/b
";
        let modules = parse_manifest(manifest);
        let paths: Vec<&str> = modules.iter().map(|m| m.path.as_str()).collect();
        assert_eq!(paths, vec!["example.com/good", "example.com/next"]);
        assert_eq!(version_of(&modules, "example.com/weird/pkg"), None);
    }

    #[test]
    fn wildcard_replacement_has_no_version() {
        let manifest = "\
# example.com/local => ../local
example.com/local/pkg
";
        let modules = parse_manifest(manifest);
        assert_eq!(modules.len(), 1);
        assert!(modules[0].version.is_empty());
        assert_eq!(version_of(&modules, "example.com/local/pkg"), None);
    }

    #[test]
    fn replaced_module_header_keeps_version() {
        let manifest = "\
# example.com/mod v1.4.0 => example.com/fork v1.4.1
example.com/mod/sub
";
        let modules = parse_manifest(manifest);
        assert_eq!(modules[0].version, "v1.4.0");
    }

    #[test]
    fn header_without_packages_is_dropped() {
        let manifest = "\
# example.com/only-replaced v1.0.0
## explicit
";
        assert!(parse_manifest(manifest).is_empty());
    }

    #[test]
    fn import_path_validation() {
        assert!(is_import_path("golang.org/x/text"));
        assert!(is_import_path("gopkg.in/yaml.v3"));
        assert!(!is_import_path(""));
        assert!(!is_import_path("a//b"));
        assert!(!is_import_path("/abs"));
        assert!(!is_import_path("has space"));
        assert!(!is_import_path("./rel"));
    }

    #[test]
    fn missing_manifest_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_project(dir.path()).unwrap_err();
        assert!(matches!(err, VendorError::NotFound { .. }));
    }

    #[test]
    fn resolves_manifest_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("vendor")).unwrap();
        std::fs::write(dir.path().join(MANIFEST_PATH), MANIFEST).unwrap();
        let modules = resolve_project(dir.path()).unwrap();
        assert_eq!(modules.len(), 2);
    }

    #[test]
    fn unreadable_manifest_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules.txt");
        std::fs::create_dir(&path).unwrap();
        assert!(matches!(resolve(&path), Err(VendorError::Parse { .. })));
    }

    #[test]
    fn non_utf8_bytes_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modules.txt");
        let mut content = b"# example.com/db v1.5.2\n## explicit\n".to_vec();
        content.extend_from_slice(&[b'#', b' ', 0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"example.com/db/sql\n");
        std::fs::write(&path, content).unwrap();

        let modules = resolve(&path).unwrap();
        assert_eq!(version_of(&modules, "example.com/db/sql"), Some("v1.5.2"));
    }
}
