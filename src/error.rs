use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Fatal failures: the file could not be read at all.
///
/// Content problems never land here; they degrade to [`Diagnostic`]s.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidEncoding(std::str::Utf8Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::InvalidEncoding(err) => write!(f, "invalid UTF-8 input: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InvalidEncoding(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(value: std::str::Utf8Error) -> Self {
        Self::InvalidEncoding(value)
    }
}

/// A non-fatal, warning-class problem.
///
/// Diagnostics are accumulated in [`ParseOutput`](crate::ParseOutput) and
/// [`LoadReport`](crate::LoadReport); the loader also logs each one through
/// `tracing::warn!`. None of them aborts parsing or loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The line has no `=` or its key contains invalid characters. Carries
    /// the exact offending line text; the line is skipped.
    MalformedLine { line: String },
    /// The resolved dotenv path does not exist; the load is a no-op.
    MissingFile { path: PathBuf },
    /// Safe mode: keys defined in `.env.example` but absent (or empty) in
    /// the environment, in example-file order.
    MissingExampleKeys { keys: Vec<String> },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedLine { line } => {
                write!(f, "Line '{line}' doesn't match format")
            }
            Self::MissingFile { path } => {
                write!(f, "Not reading {} - it doesn't exist.", path.display())
            }
            Self::MissingExampleKeys { keys } => {
                write!(
                    f,
                    "The following variables were defined in .env.example but \
                     are not present in the environment:\n {}",
                    keys.join(" ")
                )
            }
        }
    }
}
