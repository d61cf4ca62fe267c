//! Import-path index over all loaded rules.

use std::collections::BTreeMap;

use tracing::debug;

use crate::rules::Rule;

/// Position of a rule within the candidate list of its import path.
///
/// Stable for the lifetime of the repository, so it can key a per-unit
/// working set of still-unmatched rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub usize);

/// Immutable mapping from import path to the rules that target it.
///
/// Built once before matching starts and only read afterwards; share it
/// behind an `Arc` across matching tasks.
#[derive(Debug, Clone, Default)]
pub struct RuleRepository {
    rules: BTreeMap<String, Vec<Rule>>,
}

impl RuleRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenates rule sources, indexing each rule by import path.
    ///
    /// Rules are neither merged nor deduplicated; within an import path
    /// they keep source order.
    #[must_use]
    pub fn build<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = Rule>,
    {
        let mut rules: BTreeMap<String, Vec<Rule>> = BTreeMap::new();
        for rule in sources.into_iter().flatten() {
            rules
                .entry(rule.import_path().to_string())
                .or_default()
                .push(rule);
        }
        let repo = Self { rules };
        debug!(
            "Indexed {} rules over {} import paths",
            repo.len(),
            repo.rules.len()
        );
        repo
    }

    /// Rules targeting `import_path`; empty if none are registered.
    #[must_use]
    pub fn rules_for(&self, import_path: &str) -> &[Rule] {
        self.rules
            .get(import_path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rules targeting `import_path`, paired with their [`RuleId`].
    pub fn candidates<'a>(
        &'a self,
        import_path: &str,
    ) -> impl Iterator<Item = (RuleId, &'a Rule)> + 'a {
        self.rules_for(import_path)
            .iter()
            .enumerate()
            .map(|(i, r)| (RuleId(i), r))
    }

    /// Iterates `(import path, rules)` in import path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Returns `true` if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of distinct import paths with at least one rule.
    #[must_use]
    pub fn import_path_count(&self) -> usize {
        self.rules.len()
    }
}
