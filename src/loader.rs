use std::path::{Path, PathBuf};

use tracing::warn;

use crate::env::Environment;
use crate::error::{Diagnostic, Error};
use crate::model::{Document, LoadReport};
use crate::parser::parse_path_with_env;

const DEFAULT_FILE: &str = ".env";
const EXAMPLE_FILE: &str = ".env.example";

/// Load `.env` from the current working directory into the process
/// environment.
///
/// # Safety
///
/// Writes the process environment through [`std::env::set_var`]; the caller
/// must ensure no other threads concurrently access the environment.
pub unsafe fn load() -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let mut loader = EnvLoader::new().target(unsafe { Environment::process() });
    loader.load()
}

/// Load a dotenv file (or `<dir>/.env` for a directory path) into the
/// process environment.
///
/// # Safety
///
/// Same contract as [`load`].
pub unsafe fn load_from(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    // SAFETY: forwarded to the caller.
    let mut loader = EnvLoader::new()
        .path(path)
        .target(unsafe { Environment::process() });
    loader.load()
}

/// Builder-style dotenv loader.
///
/// The default target is an in-memory environment, so nothing touches
/// process state unless [`Environment::process`] is supplied explicitly.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    path: Option<PathBuf>,
    safe: bool,
    target: Environment,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dotenv file to read. A directory path gets `.env` appended.
    /// Defaults to `.env` in the current working directory.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Cross-check the result against a sibling `.env.example` and report
    /// keys that the example defines but the environment lacks.
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    pub fn target(mut self, target: Environment) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &Environment {
        &self.target
    }

    pub fn into_target(self) -> Environment {
        self.target
    }

    /// Resolve the path, parse the file, and apply entries to the target
    /// with set-if-absent semantics (a variable that already exists keeps
    /// its value).
    ///
    /// A missing file is not an error: it is recorded as
    /// [`Diagnostic::MissingFile`] and the load is a no-op.
    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let path = self.resolved_path();
        let mut report = LoadReport::default();

        if !path.exists() {
            report.diagnostics.push(self.emit(Diagnostic::MissingFile { path }));
            return Ok(report);
        }

        let output = parse_path_with_env(&path, &self.target)?;
        for diagnostic in &output.diagnostics {
            warn!("{diagnostic}");
        }
        report.diagnostics = output.diagnostics;

        for entry in &output.document {
            if self.target.contains_key(&entry.key) {
                report.skipped_existing += 1;
                continue;
            }
            self.target.set(&entry.key, &entry.value);
            report.loaded += 1;
        }

        if self.safe {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let example = read_example(dir, &self.target)?;
            let missing = diff_missing_keys(&example, &self.target);
            if !missing.is_empty() {
                report
                    .diagnostics
                    .push(self.emit(Diagnostic::MissingExampleKeys { keys: missing }));
            }
        }

        Ok(report)
    }

    fn emit(&self, diagnostic: Diagnostic) -> Diagnostic {
        warn!("{diagnostic}");
        diagnostic
    }

    fn resolved_path(&self) -> PathBuf {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FILE));
        if path.is_dir() {
            path.join(DEFAULT_FILE)
        } else {
            path
        }
    }
}

/// Parse `<dir>/.env.example` if present, else return an empty document.
///
/// Never fails on a missing file; `env` supplies expansion fallback values.
pub fn read_example(dir: impl AsRef<Path>, env: &Environment) -> Result<Document, Error> {
    let path = dir.as_ref().join(EXAMPLE_FILE);
    if !path.exists() {
        return Ok(Document::new());
    }
    let output = parse_path_with_env(&path, env)?;
    Ok(output.document)
}

/// Keys defined in `example` but absent (or empty) in `env`, in the
/// example's original order.
pub fn diff_missing_keys(example: &Document, env: &Environment) -> Vec<String> {
    example
        .iter()
        .filter(|entry| env.get(&entry.key).map(|value| value.is_empty()).unwrap_or(true))
        .map(|entry| entry.key.clone())
        .collect()
}
