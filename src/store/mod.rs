//! Entity store collaborator.
//!
//! # Data Flow
//! ```text
//! resolve / bundle export
//!     → Store::get(kind, id) / Store::list(kind)   (read-only)
//! bundle import
//!     → StagedStore (bundle entities over the live store)
//!     → validation through the resolver
//!     → StagedStore::commit → Store::put
//! ```
//!
//! # Design Decisions
//! - Synchronous lookups; callers bound the overall request
//! - `NotFound` is the only store error the engine interprets; everything
//!   else is opaque and propagated
//! - Listings are ordered by creation time, then key

pub mod memory;
pub mod staged;

use thiserror::Error;

use crate::entity::{Entity, EntityKind, Typed};

pub use memory::MemoryStore;
pub use staged::StagedStore;

/// Errors raised by a store implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// No entity of this kind under this key.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },

    /// The record under the key is a different kind of entity.
    #[error("expected a {expected}, found a {actual}")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },

    /// The entity cannot be stored without a key.
    #[error("{0} has no id")]
    MissingKey(EntityKind),

    /// Backend failure, opaque to the engine.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Filter applied to a listing.
pub type Predicate<'a> = &'a dyn Fn(&Entity) -> bool;

/// Key-based access to stored entities.
pub trait Store: Send + Sync {
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Entity>;

    fn list(&self, kind: EntityKind, predicate: Option<Predicate<'_>>) -> StoreResult<Vec<Entity>>;

    fn put(&self, entity: Entity) -> StoreResult<()>;
}

/// Typed convenience over [`Store`].
pub trait StoreExt: Store {
    fn fetch<T: Typed>(&self, id: &str) -> StoreResult<T> {
        tracing::trace!(kind = %T::KIND, id = %id, "Store lookup");
        let entity = self.get(T::KIND, id)?;
        T::from_entity(entity).map_err(|other| StoreError::KindMismatch {
            expected: T::KIND,
            actual: other.kind(),
        })
    }

    fn fetch_all<T: Typed>(&self) -> StoreResult<Vec<T>> {
        self.list(T::KIND, None)?
            .into_iter()
            .map(|entity| {
                T::from_entity(entity).map_err(|other| StoreError::KindMismatch {
                    expected: T::KIND,
                    actual: other.kind(),
                })
            })
            .collect()
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
