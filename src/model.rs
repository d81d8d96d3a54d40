use std::collections::{BTreeMap, HashMap};

use crate::error::Diagnostic;

/// A resolved `KEY=VALUE` pair destined for the environment.
///
/// The value is fully resolved by the time an entry exists: quotes are
/// removed, escapes are processed, and variable references are expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// The ordered result of parsing one dotenv source.
///
/// Keys keep their first-insertion position; assigning an existing key
/// replaces its value in place (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: Vec<Entry>,
    by_key: HashMap<String, usize>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing_idx) = self.by_key.get(&key).copied() {
            self.entries[existing_idx].value = value;
        } else {
            self.by_key.insert(key.clone(), self.entries.len());
            self.entries.push(Entry { key, value });
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|idx| self.entries[*idx].value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<(String, String)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut document = Document::new();
        for (key, value) in iter {
            document.insert(key, value);
        }
        document
    }
}

/// Parsed document plus the non-fatal problems encountered along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    pub document: Document,
    pub diagnostics: Vec<Diagnostic>,
}

/// Summary of a load operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Entries written to the target environment.
    pub loaded: usize,
    /// Entries skipped because the variable already existed.
    pub skipped_existing: usize,
    /// Non-fatal problems: malformed lines, a missing file, missing
    /// example keys in safe mode.
    pub diagnostics: Vec<Diagnostic>,
}
