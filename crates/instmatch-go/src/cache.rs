//! Per-unit cache of parsed source files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::extractor::{ParseError, SourceFile, SourceParser};

/// Parsed files of one compile unit, keyed by path.
///
/// Each file is read at most once per kind of parse. Failures are logged,
/// remembered as `None` and never retried. A cache belongs to a single
/// matching call and is dropped with it.
pub struct SourceCache<'p> {
    parser: &'p dyn SourceParser,
    packages: HashMap<PathBuf, Option<String>>,
    files: HashMap<PathBuf, Option<SourceFile>>,
    reads: usize,
}

impl<'p> SourceCache<'p> {
    /// Creates an empty cache over `parser`.
    #[must_use]
    pub fn new(parser: &'p dyn SourceParser) -> Self {
        Self {
            parser,
            packages: HashMap::new(),
            files: HashMap::new(),
            reads: 0,
        }
    }

    /// Package name of `path`, from a full parse if one is cached and a
    /// package-clause-only parse otherwise.
    pub fn package(&mut self, path: &Path) -> Option<&str> {
        if matches!(self.files.get(path), Some(Some(_))) {
            return self
                .files
                .get(path)
                .and_then(Option::as_ref)
                .map(|file| file.package.as_str());
        }
        let parser = self.parser;
        let reads = &mut self.reads;
        self.packages
            .entry(path.to_path_buf())
            .or_insert_with(|| load(path, reads, |src| parser.parse_package(src)))
            .as_deref()
    }

    /// Full parse of `path`.
    pub fn file(&mut self, path: &Path) -> Option<&SourceFile> {
        let parser = self.parser;
        let reads = &mut self.reads;
        self.files
            .entry(path.to_path_buf())
            .or_insert_with(|| load(path, reads, |src| parser.parse_file(src)))
            .as_ref()
    }

    /// Number of times a file was read from disk.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads
    }
}

fn load<T>(
    path: &Path,
    reads: &mut usize,
    parse: impl FnOnce(&str) -> Result<T, ParseError>,
) -> Option<T> {
    *reads += 1;
    let result = std::fs::read_to_string(path)
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|src| parse(&src));
    match result {
        Ok(parsed) => {
            debug!("Parsed {}", path.display());
            Some(parsed)
        }
        Err(e) => {
            warn!("Skipping {}: {e}", path.display());
            None
        }
    }
}
