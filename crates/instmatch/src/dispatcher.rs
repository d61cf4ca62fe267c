//! Concurrent matching across all compile units of a build.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use instmatch_core::{vendor, CompileUnit, MatchConfig, RuleBundle};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::MatchError;
use crate::matcher::UnitMatcher;

/// Runs a [`UnitMatcher`] over many compile units at once.
pub struct Dispatcher {
    matcher: Arc<UnitMatcher>,
}

impl Dispatcher {
    /// Creates a dispatcher around `matcher`.
    #[must_use]
    pub fn new(matcher: UnitMatcher) -> Self {
        Self {
            matcher: Arc::new(matcher),
        }
    }

    /// Builds the repository and, in vendor mode, reads the manifest as
    /// `config` describes. Paths are resolved against `project_dir`.
    ///
    /// # Errors
    ///
    /// Fails if a rule source is malformed or, in vendor mode, if the
    /// manifest is missing or unreadable.
    pub fn from_config(config: &MatchConfig, project_dir: &Path) -> Result<Self, MatchError> {
        let repository = config.build_repository(project_dir)?;
        let mut matcher = UnitMatcher::new(Arc::new(repository));

        if config.vendor.enabled {
            let manifest = config.manifest_path(project_dir);
            let modules = vendor::resolve(&manifest)?;
            info!(
                "Vendor mode: {} modules from {}",
                modules.len(),
                manifest.display()
            );
            matcher = matcher.with_vendor(modules);
        }

        let dispatcher = Self::new(matcher);
        if config.verbose {
            dispatcher.dump();
        }
        Ok(dispatcher)
    }

    /// The shared matcher.
    #[must_use]
    pub fn matcher(&self) -> &UnitMatcher {
        &self.matcher
    }

    fn dump(&self) {
        for (import_path, rules) in self.matcher.repository().iter() {
            debug!("Available rules for {import_path}:");
            for rule in rules {
                debug!("  {rule}");
            }
        }
        for module in self.matcher.vendor_modules().unwrap_or_default() {
            debug!(
                "Vendor module {} {} ({} packages)",
                module.path,
                module.version,
                module.submodules.len()
            );
        }
    }

    /// Matches every unit concurrently and returns the valid bundles.
    ///
    /// Each unit runs as its own blocking task and reports over a shared
    /// channel; the call returns once every task has reported. Result order
    /// is unspecified.
    pub async fn dispatch(&self, units: Vec<CompileUnit>) -> Vec<RuleBundle> {
        let total = units.len();
        let (tx, mut rx) = mpsc::unbounded_channel::<RuleBundle>();

        for unit in units {
            let matcher = Arc::clone(&self.matcher);
            let tx = tx.clone();
            tokio::task::spawn_blocking(move || {
                let bundle = matcher.match_unit(&unit);
                if tx.send(bundle).is_err() {
                    debug!("Result for {} dropped: receiver gone", unit.import_path());
                }
            });
        }
        drop(tx);

        let mut bundles = Vec::new();
        let mut received = 0;
        while received < total {
            let Some(bundle) = rx.recv().await else {
                warn!(
                    "{} matching tasks ended without a result",
                    total - received
                );
                break;
            };
            received += 1;
            if bundle.is_valid() {
                bundles.push(bundle);
            }
        }

        info!(
            "Matched {} of {total} compile units",
            bundles.len()
        );
        bundles
    }

    /// Parses compile command lines and dispatches them.
    ///
    /// # Errors
    ///
    /// Fails before any matching starts if a line has no import path.
    pub async fn dispatch_commands<I, S>(&self, lines: I) -> Result<Vec<RuleBundle>, MatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let units = lines
            .into_iter()
            .map(|line| CompileUnit::from_command_line(line.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.dispatch(units).await)
    }

    /// [`Self::dispatch`] with a limit on the whole run.
    ///
    /// Tasks already running are not interrupted; their results are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Timeout`] if the limit elapses first.
    pub async fn dispatch_with_timeout(
        &self,
        units: Vec<CompileUnit>,
        limit: Duration,
    ) -> Result<Vec<RuleBundle>, MatchError> {
        tokio::time::timeout(limit, self.dispatch(units))
            .await
            .map_err(|_| MatchError::Timeout(limit))
    }

    /// Matches units one after another on the current thread.
    #[must_use]
    pub fn dispatch_sequential(&self, units: &[CompileUnit]) -> Vec<RuleBundle> {
        units
            .iter()
            .map(|unit| self.matcher.match_unit(unit))
            .filter(RuleBundle::is_valid)
            .collect()
    }
}
