//! Per-package match results handed to the rewriting step.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::rules::{Rule, RuleKind};

/// Which rules apply to one package, and where.
///
/// File rules apply to the package as a whole. Struct and func rules are
/// recorded against the source file holding the matched declaration, in
/// match order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleBundle {
    import_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    package_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    file_rules: Vec<Rule>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    struct_rules: BTreeMap<PathBuf, Vec<Rule>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    func_rules: BTreeMap<PathBuf, Vec<Rule>>,
}

impl RuleBundle {
    /// Creates an empty (invalid) bundle for `import_path`.
    #[must_use]
    pub fn new(import_path: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            ..Self::default()
        }
    }

    /// Import path of the package.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    /// Package name from the first successfully parsed file.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    /// Records the package name unless one is already set.
    pub fn set_package_name(&mut self, name: &str) {
        if self.package_name.is_none() && !name.is_empty() {
            self.package_name = Some(name.to_string());
        }
    }

    /// Records a matched file rule.
    pub fn add_file_rule(&mut self, rule: Rule) {
        debug_assert_eq!(rule.kind(), RuleKind::File);
        self.file_rules.push(rule);
    }

    /// Records a struct or func rule matched in `file`. File rules are
    /// routed to [`Self::add_file_rule`].
    pub fn add_match(&mut self, file: &Path, rule: Rule) {
        let map = match rule.kind() {
            RuleKind::File => return self.add_file_rule(rule),
            RuleKind::Struct => &mut self.struct_rules,
            RuleKind::Func => &mut self.func_rules,
        };
        map.entry(file.to_path_buf()).or_default().push(rule);
    }

    /// File rules matched for the package.
    #[must_use]
    pub fn file_rules(&self) -> &[Rule] {
        &self.file_rules
    }

    /// Struct rules per source file.
    #[must_use]
    pub fn struct_rules(&self) -> &BTreeMap<PathBuf, Vec<Rule>> {
        &self.struct_rules
    }

    /// Func rules per source file.
    #[must_use]
    pub fn func_rules(&self) -> &BTreeMap<PathBuf, Vec<Rule>> {
        &self.func_rules
    }

    /// All struct and func rules matched in `file`, struct rules first.
    pub fn rules_in(&self, file: &Path) -> impl Iterator<Item = &Rule> {
        self.struct_rules
            .get(file)
            .into_iter()
            .chain(self.func_rules.get(file))
            .flatten()
    }

    /// Source files with at least one matched declaration.
    #[must_use]
    pub fn files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = self
            .struct_rules
            .keys()
            .chain(self.func_rules.keys())
            .map(PathBuf::as_path)
            .collect();
        files.sort();
        files.dedup();
        files
    }

    /// Total number of matched rules.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.file_rules.len()
            + self.struct_rules.values().map(Vec::len).sum::<usize>()
            + self.func_rules.values().map(Vec::len).sum::<usize>()
    }

    /// A bundle is valid once it holds at least one match.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.match_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleBase;

    #[test]
    fn empty_bundle_is_invalid() {
        let bundle = RuleBundle::new("net/http");
        assert!(!bundle.is_valid());
        assert_eq!(bundle.match_count(), 0);
        assert!(bundle.package_name().is_none());
    }

    #[test]
    fn package_name_is_set_once() {
        let mut bundle = RuleBundle::new("net/http");
        bundle.set_package_name("http");
        bundle.set_package_name("other");
        assert_eq!(bundle.package_name(), Some("http"));
    }

    #[test]
    fn matches_are_kept_per_file_and_kind() {
        let base = RuleBase::new("database/sql");
        let mut bundle = RuleBundle::new("database/sql");
        let sql = Path::new("/src/database/sql/sql.go");
        let ctx = Path::new("/src/database/sql/ctxutil.go");

        bundle.add_match(sql, Rule::structure(base.clone(), "DB"));
        bundle.add_match(sql, Rule::func(base.clone(), "Open", ""));
        bundle.add_match(ctx, Rule::func(base.clone(), "ctxDriverPrepare", ""));
        bundle.add_match(sql, Rule::file(base, "hook.go"));

        assert!(bundle.is_valid());
        assert_eq!(bundle.match_count(), 4);
        assert_eq!(bundle.file_rules().len(), 1);
        assert_eq!(bundle.struct_rules()[sql].len(), 1);
        assert_eq!(bundle.func_rules()[sql].len(), 1);
        assert_eq!(bundle.files(), vec![ctx, sql]);

        let in_sql: Vec<RuleKind> = bundle.rules_in(sql).map(Rule::kind).collect();
        assert_eq!(in_sql, vec![RuleKind::Struct, RuleKind::Func]);
    }

    #[test]
    fn serializes_only_populated_sections() {
        let mut bundle = RuleBundle::new("fmt");
        bundle.set_package_name("fmt");
        bundle.add_file_rule(Rule::file(RuleBase::new("fmt"), "hook.go"));
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["importPath"], "fmt");
        assert_eq!(json["packageName"], "fmt");
        assert_eq!(json["fileRules"].as_array().map(Vec::len), Some(1));
        assert!(json.get("funcRules").is_none());
    }
}
