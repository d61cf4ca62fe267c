//! Rule matching for a single compile unit.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use instmatch_core::version::{self, extract_path_version};
use instmatch_core::{vendor, CompileUnit, Rule, RuleBundle, RuleId, RuleRepository, RuleTarget};
use instmatch_go::{find_match, GoParser, SourceCache, SourceParser};
use tracing::{debug, warn};

/// Decides which rules apply to one compile unit and where.
///
/// Holds only shared, read-only state, so one matcher serves every unit of
/// a build concurrently.
pub struct UnitMatcher {
    repository: Arc<RuleRepository>,
    vendor_modules: Option<Arc<[vendor::VendorModule]>>,
    parser: Arc<dyn SourceParser>,
}

impl UnitMatcher {
    /// Creates a matcher over `repository` using the Go parser.
    #[must_use]
    pub fn new(repository: Arc<RuleRepository>) -> Self {
        Self {
            repository,
            vendor_modules: None,
            parser: Arc::new(GoParser::new()),
        }
    }

    /// Resolves dependency versions from vendored modules first.
    #[must_use]
    pub fn with_vendor(mut self, modules: impl Into<Arc<[vendor::VendorModule]>>) -> Self {
        self.vendor_modules = Some(modules.into());
        self
    }

    /// Replaces the source parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn SourceParser>) -> Self {
        self.parser = parser;
        self
    }

    /// The rule repository.
    #[must_use]
    pub fn repository(&self) -> &RuleRepository {
        &self.repository
    }

    /// Vendored modules, if vendor mode is on.
    #[must_use]
    pub fn vendor_modules(&self) -> Option<&[vendor::VendorModule]> {
        self.vendor_modules.as_deref()
    }

    /// Matches the repository's rules against one unit.
    ///
    /// Source files are visited in argument order and, within a file, the
    /// still-unmatched rules in repository order. A rule is retired after
    /// its first match, so it is reported at most once per unit. The
    /// returned bundle is invalid when nothing matched.
    #[must_use]
    pub fn match_unit(&self, unit: &CompileUnit) -> RuleBundle {
        let import_path = unit.import_path();
        let mut bundle = RuleBundle::new(import_path);

        let mut remaining: BTreeSet<RuleId> = self
            .repository
            .candidates(import_path)
            .map(|(id, _)| id)
            .collect();
        if remaining.is_empty() {
            return bundle;
        }
        debug!(
            "Matching {import_path}: {} candidate rules, {} files",
            remaining.len(),
            unit.sources().len()
        );

        let vendor_version = self
            .vendor_modules
            .as_deref()
            .and_then(|modules| vendor::version_of(modules, import_path));
        let compiler_version = unit.compiler_version();
        let mut cache = SourceCache::new(self.parser.as_ref());

        for file in unit.sources() {
            if remaining.is_empty() {
                break;
            }
            let version = vendor_version
                .map(str::to_owned)
                .or_else(|| extract_path_version(file));

            for (id, rule) in self.repository.candidates(import_path) {
                if !remaining.contains(&id)
                    || !is_eligible(rule, file, version.as_deref(), compiler_version)
                {
                    continue;
                }
                if match_rule(&mut cache, &mut bundle, file, rule) {
                    remaining.remove(&id);
                }
            }
        }

        debug!(
            "Matched {} rules for {import_path} ({} files read)",
            bundle.match_count(),
            cache.reads()
        );
        bundle
    }
}

/// Attempts `rule` against `file`, recording a hit in `bundle`.
fn match_rule(
    cache: &mut SourceCache<'_>,
    bundle: &mut RuleBundle,
    file: &Path,
    rule: &Rule,
) -> bool {
    if let RuleTarget::File { .. } = rule.target() {
        // Only the package clause is needed to add a file.
        let Some(package) = cache.package(file) else {
            return false;
        };
        bundle.set_package_name(package);
        debug!("Match {rule}");
        bundle.add_file_rule(rule.clone());
        return true;
    }

    let Some(parsed) = cache.file(file) else {
        return false;
    };
    bundle.set_package_name(&parsed.package);
    match find_match(parsed, rule.target()) {
        Some(decl) => {
            debug!("Match {rule} at {}:{}", file.display(), decl.line);
            bundle.add_match(file, rule.clone());
            true
        }
        None => false,
    }
}

/// Checks the dependency and compiler version windows of `rule`.
///
/// A comparison that cannot be evaluated excludes the rule for this file
/// only.
fn is_eligible(rule: &Rule, file: &Path, version: Option<&str>, compiler: Option<&str>) -> bool {
    in_range(rule, file, "version", version, rule.version())
        && in_range(rule, file, "go version", compiler, rule.go_version())
}

fn in_range(rule: &Rule, file: &Path, what: &str, version: Option<&str>, range: &str) -> bool {
    if range.is_empty() {
        return true;
    }
    let Some(version) = version else {
        debug!("No {what} for {} to check {rule} against", file.display());
        return false;
    };
    match version::matches(version, range) {
        Ok(matched) => matched,
        Err(e) => {
            warn!(
                "Bad match: file {}, rule {rule}, {what} {version}: {e}",
                file.display()
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use instmatch_core::{RuleBase, VendorModule};
    use instmatch_go::{Declaration, ParseError, SourceFile};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) -> String {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn unit(import_path: &str, lang: &str, files: &[&str]) -> CompileUnit {
        let mut args = vec!["compile", "-p", import_path, "-lang", lang];
        args.extend_from_slice(files);
        CompileUnit::from_args(args).unwrap()
    }

    fn matcher(rules: Vec<Rule>) -> UnitMatcher {
        UnitMatcher::new(Arc::new(RuleRepository::build([rules])))
    }

    fn func_names(bundle: &RuleBundle) -> Vec<String> {
        bundle
            .func_rules()
            .values()
            .flatten()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn no_candidates_reads_nothing() {
        let m = matcher(vec![Rule::func(RuleBase::new("a"), "F", "")]);
        let bundle = m.match_unit(&unit("b", "go1.22", &["/nonexistent/b.go"]));
        assert!(!bundle.is_valid());
        assert!(bundle.package_name().is_none());
    }

    #[test]
    fn matches_function_in_module_cache_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "mod/example.com/db@v1.5.2/sql.go",
            "package sql\n\nfunc Open(name string) error { return nil }\n",
        );
        let rule = Rule::func(
            RuleBase::new("example.com/db").with_version("[1.0.0,2.0.0)"),
            "Open",
            "",
        );
        let bundle = matcher(vec![rule]).match_unit(&unit("example.com/db", "go1.22", &[file.as_str()]));

        assert!(bundle.is_valid());
        assert_eq!(bundle.package_name(), Some("sql"));
        assert_eq!(bundle.func_rules()[&PathBuf::from(&file)].len(), 1);
    }

    #[test]
    fn version_outside_range_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "mod/example.com/db@v2.0.0/sql.go",
            "package sql\nfunc Open() {}\n",
        );
        let rule = Rule::func(
            RuleBase::new("example.com/db").with_version("[1.0.0,2.0.0)"),
            "Open",
            "",
        );
        let bundle = matcher(vec![rule]).match_unit(&unit("example.com/db", "go1.22", &[file.as_str()]));
        assert!(!bundle.is_valid());
    }

    #[test]
    fn constrained_rule_without_version_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "src/sql.go", "package sql\nfunc Open() {}\n");
        let rule = Rule::func(RuleBase::new("db").with_version("[1.0.0,)"), "Open", "");
        let bundle = matcher(vec![rule]).match_unit(&unit("db", "go1.22", &[file.as_str()]));
        assert!(!bundle.is_valid());
    }

    #[test]
    fn vendor_version_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "mod/example.com/db@v3.0.0/sql.go",
            "package sql\nfunc Open() {}\n",
        );
        let rule = Rule::func(
            RuleBase::new("example.com/db/sql").with_version("[1.0.0,2.0.0)"),
            "Open",
            "",
        );
        let modules = vec![VendorModule {
            path: "example.com/db".into(),
            version: "v1.5.2".into(),
            submodules: vec!["example.com/db/sql".into()],
        }];
        let bundle = matcher(vec![rule])
            .with_vendor(modules)
            .match_unit(&unit("example.com/db/sql", "go1.22", &[file.as_str()]));
        assert!(bundle.is_valid());
    }

    #[test]
    fn go_version_window() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "runtime/proc.go", "package runtime\nfunc main() {}\n");
        let rule = Rule::file(RuleBase::new("runtime").with_go_version("[1.18,)"), "hook.go");
        let m = matcher(vec![rule]);

        let bundle = m.match_unit(&unit("runtime", "go1.22", &[file.as_str()]));
        assert_eq!(bundle.file_rules().len(), 1);
        assert_eq!(bundle.package_name(), Some("runtime"));

        assert!(!m.match_unit(&unit("runtime", "go1.17", &[file.as_str()])).is_valid());

        let no_lang = CompileUnit::from_args(["compile", "-p", "runtime", file.as_str()]).unwrap();
        assert!(!m.match_unit(&no_lang).is_valid());
    }

    #[test]
    fn malformed_range_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(
            &dir,
            "mod/example.com/db@v1.5.2/sql.go",
            "package sql\nfunc Open() {}\n",
        );
        let rule = Rule::func(
            RuleBase::new("example.com/db").with_version("[1.0.0,2.0.0"),
            "Open",
            "",
        );
        let bundle = matcher(vec![rule]).match_unit(&unit("example.com/db", "go1.22", &[file.as_str()]));
        assert!(!bundle.is_valid());
    }

    #[test]
    fn rule_fires_once_in_first_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a/a.go", "package a\nfunc init() {}\n");
        let b = write(&dir, "a/b.go", "package a\nfunc init() {}\n");
        let bundle = matcher(vec![Rule::func(RuleBase::new("a"), "init", "")])
            .match_unit(&unit("a", "go1.22", &[b.as_str(), a.as_str()]));

        assert_eq!(bundle.match_count(), 1);
        assert!(bundle.func_rules().contains_key(&PathBuf::from(&b)));
    }

    #[test]
    fn duplicate_rules_each_fire() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(&dir, "a/a.go", "package a\nfunc F() {}\n");
        let rule = Rule::func(RuleBase::new("a"), "F", "");
        let bundle = matcher(vec![rule.clone(), rule]).match_unit(&unit("a", "go1.22", &[a.as_str()]));
        assert_eq!(bundle.match_count(), 2);
    }

    #[test]
    fn unparsable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(&dir, "a/broken.go", "package a\nfunc (\n");
        let good = write(&dir, "a/good.go", "package a\ntype T struct{}\nfunc (t *T) M() {}\n");
        let bundle = matcher(vec![
            Rule::structure(RuleBase::new("a"), "T"),
            Rule::func(RuleBase::new("a"), "M", "*T"),
        ])
        .match_unit(&unit("a", "go1.22", &[broken.as_str(), good.as_str()]));

        assert_eq!(
            func_names(&bundle),
            vec!["func a.(*T).M".to_string()]
        );
        assert_eq!(bundle.struct_rules()[&PathBuf::from(&good)].len(), 1);
        assert_eq!(bundle.files(), vec![Path::new(&good)]);
    }

    #[test]
    fn file_rule_only_needs_package_clause() {
        let dir = tempfile::tempdir().unwrap();
        let broken = write(&dir, "x/x.go", "package x\nfunc (\n");
        let bundle = matcher(vec![Rule::file(RuleBase::new("x"), "hook.go")])
            .match_unit(&unit("x", "go1.22", &[broken.as_str()]));

        assert_eq!(bundle.file_rules().len(), 1);
        assert_eq!(bundle.package_name(), Some("x"));
    }

    #[test]
    fn file_rule_recorded_once_per_unit() {
        let dir = tempfile::tempdir().unwrap();
        let first = write(&dir, "x/first.go", "package first\n");
        let second = write(&dir, "x/second.go", "package second\nfunc F() {}\n");
        let bundle = matcher(vec![
            Rule::file(RuleBase::new("x"), "hook.go"),
            Rule::func(RuleBase::new("x"), "F", ""),
        ])
        .match_unit(&unit("x", "go1.22", &[first.as_str(), second.as_str()]));

        assert_eq!(bundle.file_rules().len(), 1);
        assert_eq!(bundle.match_count(), 2);
        assert_eq!(bundle.package_name(), Some("first"));
    }

    struct FixedParser;

    impl SourceParser for FixedParser {
        fn parse_package(&self, _source: &str) -> Result<String, ParseError> {
            Ok("fixed".into())
        }

        fn parse_file(&self, _source: &str) -> Result<SourceFile, ParseError> {
            Ok(SourceFile {
                package: "fixed".into(),
                declarations: vec![Declaration::func_decl(1, "Hook", "*S")],
            })
        }
    }

    #[test]
    fn custom_parser_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let file = write(&dir, "x/x.go", "not go at all");
        let rule = Rule::func(RuleBase::new("x"), "Hook", "*S");

        let stock = matcher(vec![rule.clone()]).match_unit(&unit("x", "go1.22", &[file.as_str()]));
        assert!(!stock.is_valid());

        let bundle = matcher(vec![rule])
            .with_parser(Arc::new(FixedParser))
            .match_unit(&unit("x", "go1.22", &[file.as_str()]));
        assert_eq!(bundle.package_name(), Some("fixed"));
        assert_eq!(func_names(&bundle), vec!["func x.(*S).Hook".to_string()]);
    }
}
