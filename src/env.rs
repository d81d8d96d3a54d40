use std::collections::BTreeMap;

/// The ambient variable table: expansion fallback source and load target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    kind: EnvironmentKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EnvironmentKind {
    /// The real process environment.
    ///
    /// Writes go through [`std::env::set_var`], which mutates global
    /// process state and is not thread-safe for concurrent environment
    /// access.
    Process,
    /// An in-memory map, detached from the process.
    Memory(BTreeMap<String, String>),
}

impl Default for Environment {
    fn default() -> Self {
        Self::memory()
    }
}

impl Environment {
    /// The process environment.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write
    /// the process environment for the duration of operations that may
    /// mutate this environment.
    pub unsafe fn process() -> Self {
        Self {
            kind: EnvironmentKind::Process,
        }
    }

    /// An empty in-memory environment.
    ///
    /// Use this to parse and load without touching process state.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// An in-memory environment pre-seeded from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: EnvironmentKind::Memory(map),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            EnvironmentKind::Memory(map) => Some(map),
            EnvironmentKind::Process => None,
        }
    }

    /// Whether the variable exists, regardless of its value.
    pub fn contains_key(&self, key: &str) -> bool {
        match &self.kind {
            EnvironmentKind::Process => std::env::var_os(key).is_some(),
            EnvironmentKind::Memory(map) => map.contains_key(key),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match &self.kind {
            EnvironmentKind::Process => {
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            EnvironmentKind::Memory(map) => map.get(key).cloned(),
        }
    }

    pub(crate) fn set(&mut self, key: &str, value: &str) {
        match &mut self.kind {
            EnvironmentKind::Process => unsafe { std::env::set_var(key, value) },
            EnvironmentKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
    }
}
