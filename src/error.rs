//! Engine error type shared by the resolver, plugin merger and projector.

use thiserror::Error;

use crate::entity::EntityKind;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A referenced entity does not exist.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },

    /// A plugin configuration the engine interprets has the wrong shape.
    #[error("malformed `{plugin}` configuration: {reason}")]
    MalformedPluginData { plugin: String, reason: String },

    /// Any other store failure, propagated unchanged.
    #[error(transparent)]
    Store(StoreError),
}

impl EngineError {
    pub fn malformed(plugin: &str, reason: impl Into<String>) -> Self {
        Self::MalformedPluginData {
            plugin: plugin.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_engine_not_found() {
        let err: EngineError = StoreError::NotFound {
            kind: EntityKind::Upstream,
            id: "u9".into(),
        }
        .into();
        assert_eq!(
            err,
            EngineError::NotFound {
                kind: EntityKind::Upstream,
                id: "u9".into()
            }
        );
        assert_eq!(err.to_string(), "upstream `u9` not found");
    }

    #[test]
    fn test_backend_errors_pass_through() {
        let err: EngineError = StoreError::Backend("etcd down".into()).into();
        assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));
    }
}
