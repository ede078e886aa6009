use serde::{Deserialize, Serialize};

/// A named value pulled out of an exported bundle and referenced from it as
/// `${key}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The placeholder text standing in for this variable.
    pub fn placeholder(&self) -> String {
        placeholder(&self.key)
    }
}

pub fn placeholder(key: &str) -> String {
    format!("${{{key}}}")
}
