//! Compile units extracted from compiler command lines.

use std::path::{Path, PathBuf};

use crate::version::normalize_compiler_version;

/// Flag preceding the package import path.
pub const IMPORT_PATH_FLAG: &str = "-p";
/// Flag preceding the compiler language version.
pub const COMPILER_VERSION_FLAG: &str = "-lang";
/// Extension of source files passed to the compiler.
pub const SOURCE_EXTENSION: &str = "go";

/// Errors from interpreting a compiler command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitError {
    /// The import path flag is absent.
    #[error("compile command has no `{flag}` flag: {command}")]
    MissingFlag {
        /// Missing flag.
        flag: &'static str,
        /// Offending command, joined with spaces.
        command: String,
    },

    /// A flag is the last argument.
    #[error("flag `{flag}` has no value")]
    MissingValue {
        /// Flag lacking its value.
        flag: &'static str,
    },
}

/// One package's compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    import_path: String,
    compiler_version: Option<String>,
    sources: Vec<PathBuf>,
    args: Vec<String>,
}

impl CompileUnit {
    /// Builds a unit from a raw argument list.
    ///
    /// Source files are kept in argument order, which decides which file
    /// wins when several could satisfy the same rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the import path flag or a flag value is missing.
    pub fn from_args<I, S>(args: I) -> Result<Self, UnitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let import_path = find_flag_value(&args, IMPORT_PATH_FLAG)?.ok_or_else(|| {
            UnitError::MissingFlag {
                flag: IMPORT_PATH_FLAG,
                command: args.join(" "),
            }
        })?;
        let compiler_version = find_flag_value(&args, COMPILER_VERSION_FLAG)?
            .as_deref()
            .map(normalize_compiler_version);

        let sources = args
            .iter()
            .filter(|a| is_source_file(a))
            .map(PathBuf::from)
            .collect();

        Ok(Self {
            import_path,
            compiler_version,
            sources,
            args,
        })
    }

    /// Builds a unit from one command line string.
    ///
    /// # Errors
    ///
    /// See [`Self::from_args`].
    pub fn from_command_line(line: &str) -> Result<Self, UnitError> {
        Self::from_args(split_command_line(line))
    }

    /// Import path of the package being compiled.
    #[must_use]
    pub fn import_path(&self) -> &str {
        &self.import_path
    }

    /// Compiler version as `v1.N`, if the command carried one.
    #[must_use]
    pub fn compiler_version(&self) -> Option<&str> {
        self.compiler_version.as_deref()
    }

    /// Source files in argument order.
    #[must_use]
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// The full argument list.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Returns the value of `flag`, written either as `flag value` or
/// `flag=value`, or `None` if `flag` is absent.
///
/// # Errors
///
/// Returns [`UnitError::MissingValue`] if `flag` is the last argument.
pub fn find_flag_value(args: &[String], flag: &'static str) -> Result<Option<String>, UnitError> {
    for (i, arg) in args.iter().enumerate() {
        if arg == flag {
            return args
                .get(i + 1)
                .cloned()
                .map(Some)
                .ok_or(UnitError::MissingValue { flag });
        }
        if let Some(value) = arg.strip_prefix(flag).and_then(|rest| rest.strip_prefix('=')) {
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn is_source_file(arg: &str) -> bool {
    !arg.starts_with('-')
        && Path::new(arg)
            .extension()
            .is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Splits a command line on whitespace, honouring single and double quotes
/// and backslash escapes inside double quotes.
#[must_use]
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(other) => {
                    current.push('\\');
                    current.push(other);
                }
                None => current.push('\\'),
            },
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_arg = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    args
}

/// Picks the compiler invocations out of a dry-build log.
///
/// A line is kept when its program (first argument) is the `compile` tool,
/// e.g. `/usr/lib/go/pkg/tool/linux_amd64/compile -o ... -p fmt ...`.
#[must_use]
pub fn compile_commands(log: &str) -> Vec<String> {
    log.lines()
        .map(str::trim)
        .filter(|line| {
            split_command_line(line)
                .first()
                .is_some_and(|prog| program_name(prog) == "compile")
        })
        .map(ToString::to_string)
        .collect()
}

/// Final path component of a program, without a `.exe` suffix. Both slash
/// styles are accepted so logs from any host can be read.
fn program_name(prog: &str) -> &str {
    let name = prog.rsplit(['/', '\\']).next().unwrap_or(prog);
    name.strip_suffix(".exe").unwrap_or(name)
}
