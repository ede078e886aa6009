//! Variable codec.
//!
//! # Data Flow
//! ```text
//! export:  entity copy → extract_* → field = "${key}", VariableSet += (key, value)
//! import:  bundle variables → VariableSet → substitute_* → field = value
//! ```
//!
//! # Design Decisions
//! - Keys are scoped by owning entity kind, name and id (see `keys`)
//! - Only inline upstreams are externalized through routes and services;
//!   referenced upstreams are handled at their own top-level entity
//! - Unresolved placeholders are left as literal text and logged

pub mod extract;
pub mod keys;
pub mod substitute;

use indexmap::IndexMap;

use crate::entity::variable::placeholder;
use crate::entity::Variable;

/// Separates a variable key from its disambiguation counter.
const KEY_SUFFIX: char = '#';

pub use extract::{extract_route, extract_service, extract_upstream};
pub use substitute::{substitute_route, substitute_service, substitute_str, substitute_upstream};

/// Ordered, de-duplicated variables of one bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableSet {
    entries: IndexMap<String, String>,
}

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key = value` and return the placeholder that replaces the
    /// value.
    ///
    /// The same value under the same key shares one placeholder. A key that
    /// already holds a different value is disambiguated with a `#<n>` suffix,
    /// so every placeholder resolves back to its own value.
    pub fn insert(&mut self, key: String, value: String) -> String {
        let mut candidate = key.clone();
        let mut suffix = 0u32;
        loop {
            match self.entries.get(&candidate) {
                Some(existing) if *existing == value => return placeholder(&candidate),
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{key}{KEY_SUFFIX}{suffix}");
                }
                None => {
                    if suffix > 0 {
                        tracing::warn!(
                            key = %key,
                            assigned = %candidate,
                            "Variable key already holds another value"
                        );
                    }
                    let placeholder = placeholder(&candidate);
                    self.entries.insert(candidate, value);
                    return placeholder;
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Variable> {
        self.entries
            .into_iter()
            .map(|(key, value)| Variable { key, value })
            .collect()
    }
}

/// Bundle variables as given. A key listed twice keeps its first value.
impl From<&[Variable]> for VariableSet {
    fn from(variables: &[Variable]) -> Self {
        let mut set = Self::new();
        for variable in variables {
            if set.entries.contains_key(&variable.key) {
                tracing::warn!(key = %variable.key, "Duplicate bundle variable ignored");
                continue;
            }
            set.entries
                .insert(variable.key.clone(), variable.value.clone());
        }
        set
    }
}
