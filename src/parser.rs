use std::io::BufRead;
use std::path::Path;

use crate::env::Environment;
use crate::error::{Diagnostic, Error};
use crate::model::{Document, ParseOutput};

/// Parse dotenv text, expanding variables against a snapshot of the
/// process environment.
pub fn parse_str(input: &str) -> ParseOutput {
    parse_str_with_env(input, &process_snapshot())
}

/// Parse dotenv text against an explicit ambient environment.
///
/// Lines are processed in order. Each entry value is resolved before it is
/// stored: quotes removed, escapes processed, and `$NAME` / `${NAME}`
/// references expanded from the document parsed so far, then from `env`,
/// then to the empty string. Expansion is a single left-to-right pass;
/// substituted text is never re-scanned.
///
/// Never fails: blank lines and comments are skipped, malformed lines are
/// recorded as [`Diagnostic::MalformedLine`] and skipped.
pub fn parse_str_with_env(input: &str, env: &Environment) -> ParseOutput {
    let mut document = Document::new();
    let mut diagnostics = Vec::new();

    for line in input.lines() {
        match parse_line(line) {
            ParsedLine::Skip => {}
            ParsedLine::Malformed => {
                diagnostics.push(Diagnostic::MalformedLine {
                    line: line.to_owned(),
                });
            }
            ParsedLine::Entry {
                key,
                value,
                quoting,
            } => {
                let resolved = resolve_value(value, quoting, &document, env);
                document.insert(key, resolved);
            }
        }
    }

    ParseOutput {
        document,
        diagnostics,
    }
}

/// Parse a dotenv file, expanding variables against a snapshot of the
/// process environment.
pub fn parse_path(path: impl AsRef<Path>) -> Result<ParseOutput, Error> {
    parse_path_with_env(path, &process_snapshot())
}

/// Parse a dotenv file against an explicit ambient environment.
pub fn parse_path_with_env(path: impl AsRef<Path>, env: &Environment) -> Result<ParseOutput, Error> {
    let bytes = std::fs::read(path)?;
    let text = std::str::from_utf8(&bytes)?;
    Ok(parse_str_with_env(text, env))
}

/// Parse dotenv text from a buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<ParseOutput, Error> {
    parse_reader_with_env(reader, &process_snapshot())
}

/// Parse dotenv text from a buffered reader against an explicit ambient
/// environment.
pub fn parse_reader_with_env<R: BufRead>(
    mut reader: R,
    env: &Environment,
) -> Result<ParseOutput, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    let text = std::str::from_utf8(&buf)?;
    Ok(parse_str_with_env(text, env))
}

fn process_snapshot() -> Environment {
    let map = std::env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect();
    Environment::from_memory(map)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    /// `'...'`: verbatim, no escapes, no expansion.
    Single,
    /// `"..."`: generic one-character unescape, expansion active.
    Double,
    /// Unquoted: inline comment stripped, `\$` escape honored, expansion
    /// active.
    Bare,
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedLine<'a> {
    Skip,
    Malformed,
    Entry {
        key: &'a str,
        value: &'a str,
        quoting: Quoting,
    },
}

fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut working = line.trim();
    if working.is_empty() || working.starts_with('#') {
        return ParsedLine::Skip;
    }

    if let Some(rest) = working.strip_prefix("export")
        && rest
            .chars()
            .next()
            .map(char::is_whitespace)
            .unwrap_or(false)
    {
        working = rest.trim_start();
    }

    let Some((raw_key, raw_value)) = working.split_once('=') else {
        return ParsedLine::Malformed;
    };

    let key = raw_key.trim();
    if key.is_empty() || !key.chars().all(is_valid_key_char) {
        return ParsedLine::Malformed;
    }

    let value = raw_value.trim();
    if let Some((inner, quoting)) = split_quoted(value) {
        return ParsedLine::Entry {
            key,
            value: inner,
            quoting,
        };
    }

    ParsedLine::Entry {
        key,
        value: strip_inline_comment(value).trim_end(),
        quoting: Quoting::Bare,
    }
}

fn is_valid_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.'
}

/// Split off the inner text of a fully quoted value.
///
/// Only a comment may follow the closing quote; anything else means the
/// value is not fully wrapped and is handled as bare text. An escaped
/// quote does not close the value.
fn split_quoted(value: &str) -> Option<(&str, Quoting)> {
    let (quote, quoting) = match value.chars().next() {
        Some('\'') => ('\'', Quoting::Single),
        Some('"') => ('"', Quoting::Double),
        _ => return None,
    };

    let closing_idx = find_closing_quote(value, quote)?;
    let tail = value[closing_idx + 1..].trim_start();
    if !tail.is_empty() && !tail.starts_with('#') {
        return None;
    }

    Some((&value[1..closing_idx], quoting))
}

fn find_closing_quote(value: &str, quote: char) -> Option<usize> {
    for (idx, ch) in value.char_indices().skip(1) {
        if ch == quote && !is_preceded_by_odd_backslashes(value.as_bytes(), idx) {
            return Some(idx);
        }
    }
    None
}

fn is_preceded_by_odd_backslashes(bytes: &[u8], idx: usize) -> bool {
    if idx == 0 {
        return false;
    }

    let mut cursor = idx;
    let mut backslash_count = 0usize;
    while cursor > 0 && bytes[cursor - 1] == b'\\' {
        cursor -= 1;
        backslash_count += 1;
    }

    backslash_count % 2 == 1
}

/// Cut a bare value at a `#` that opens the value or follows whitespace.
/// A `#` glued to preceding text stays part of the value.
fn strip_inline_comment(value: &str) -> &str {
    let mut prev_is_whitespace = true;
    for (idx, ch) in value.char_indices() {
        if ch == '#' && prev_is_whitespace {
            return &value[..idx];
        }
        prev_is_whitespace = ch.is_whitespace();
    }
    value
}

fn resolve_value(value: &str, quoting: Quoting, document: &Document, env: &Environment) -> String {
    match quoting {
        Quoting::Single => value.to_owned(),
        Quoting::Double => expand_value(value, true, document, env),
        Quoting::Bare => expand_value(value, false, document, env),
    }
}

/// Single left-to-right sweep over a value: unescape and expand at once.
///
/// `\$` always suppresses expansion of the reference that follows (the
/// backslash is dropped, the token is kept verbatim). When `unescape` is
/// set, every `\X` pair collapses to `X`; otherwise backslashes before
/// anything but `$` are ordinary characters. Unknown references expand to
/// the empty string. Substituted text is not re-scanned.
fn expand_value(input: &str, unescape: bool, document: &Document, env: &Environment) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;
    let mut idx = 0usize;

    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' if idx + 1 < bytes.len() && (unescape || bytes[idx + 1] == b'$') => {
                out.push_str(&input[cursor..idx]);
                cursor = idx + 1;
                idx += 2;
            }
            b'$' => {
                if let Some((name_start, name_end, token_end)) = parse_placeholder(input, idx) {
                    let name = &input[name_start..name_end];
                    out.push_str(&input[cursor..idx]);
                    out.push_str(&lookup_name(name, document, env));
                    cursor = token_end;
                    idx = token_end;
                } else {
                    idx += 1;
                }
            }
            _ => idx += 1,
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn lookup_name(name: &str, document: &Document, env: &Environment) -> String {
    if let Some(value) = document.get(name) {
        return value.to_owned();
    }
    env.get(name).unwrap_or_default()
}

fn parse_placeholder(input: &str, start: usize) -> Option<(usize, usize, usize)> {
    let bytes = input.as_bytes();
    if start + 1 >= bytes.len() {
        return None;
    }

    if bytes[start + 1] == b'{' {
        let mut end = start + 2;
        while end < bytes.len() && bytes[end] != b'}' {
            end += 1;
        }

        if end >= bytes.len() {
            return None;
        }

        let name_start = start + 2;
        if name_start == end || !bytes[name_start..end].iter().copied().all(is_name_byte) {
            return None;
        }

        return Some((name_start, end, end + 1));
    }

    let name_start = start + 1;
    if !is_name_byte(bytes[name_start]) {
        return None;
    }

    let mut name_end = name_start + 1;
    while name_end < bytes.len() && is_name_byte(bytes[name_end]) {
        name_end += 1;
    }

    Some((name_start, name_end, name_end))
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
