//! Parse `.env` files and load them into the process environment.
//!
//! The parser turns dotenv text into an ordered [`Document`] of resolved
//! key/value entries, tolerating malformed lines (they become
//! [`Diagnostic`]s, never errors). The [`EnvLoader`] applies a parsed
//! document to an [`Environment`] with set-if-absent semantics and can
//! cross-check the result against a sibling `.env.example` (safe mode).
//!
//! [`EnvLoader`] defaults to an in-memory target, which keeps parsing and
//! loading free of process-wide side effects. The convenience loaders
//! ([`load`], [`load_from`]) write the real process environment and are
//! `unsafe`, because callers must guarantee no concurrent environment
//! access.

mod env;
mod error;
mod loader;
mod model;
mod parser;

pub use env::Environment;
pub use error::{Diagnostic, Error};
pub use loader::{EnvLoader, diff_missing_keys, load, load_from, read_example};
pub use model::{Document, Entry, LoadReport, ParseOutput};
pub use parser::{
    parse_path, parse_path_with_env, parse_reader, parse_reader_with_env, parse_str,
    parse_str_with_env,
};
