//! Copy-on-write overlay used to validate an import before anything is
//! written to the live store.

use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::entity::{Entity, EntityKind};
use crate::store::{Predicate, Store, StoreError, StoreResult};

/// Write order on commit: referenced kinds land before their referrers.
const COMMIT_ORDER: [EntityKind; 4] = [
    EntityKind::Upstream,
    EntityKind::Service,
    EntityKind::Route,
    EntityKind::Consumer,
];

/// Staged entities layered over a base store.
///
/// Reads see staged entities first, then the base. Writes only touch the
/// overlay until [`StagedStore::commit`].
pub struct StagedStore<'a> {
    base: &'a dyn Store,
    staged: Mutex<IndexMap<(EntityKind, String), Entity>>,
}

impl<'a> StagedStore<'a> {
    pub fn new(base: &'a dyn Store) -> Self {
        Self {
            base,
            staged: Mutex::new(IndexMap::new()),
        }
    }

    /// Number of staged entities.
    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every staged entity into the base store, kind by kind.
    pub fn commit(self) -> StoreResult<usize> {
        let staged = self
            .staged
            .into_inner()
            .map_err(|_| StoreError::Backend("staging area poisoned".into()))?;

        let mut written = 0;
        for kind in COMMIT_ORDER {
            for ((k, _), entity) in staged.iter() {
                if *k == kind {
                    self.base.put(entity.clone())?;
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, IndexMap<(EntityKind, String), Entity>>> {
        self.staged
            .lock()
            .map_err(|_| StoreError::Backend("staging area poisoned".into()))
    }
}

impl Store for StagedStore<'_> {
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Entity> {
        if let Some(entity) = self.lock()?.get(&(kind, id.to_string())) {
            return Ok(entity.clone());
        }
        self.base.get(kind, id)
    }

    fn list(&self, kind: EntityKind, predicate: Option<Predicate<'_>>) -> StoreResult<Vec<Entity>> {
        let staged = self.lock()?;
        let mut rows: Vec<Entity> = self
            .base
            .list(kind, predicate)?
            .into_iter()
            .filter(|e| {
                e.key()
                    .map_or(true, |key| !staged.contains_key(&(kind, key.to_string())))
            })
            .collect();

        rows.extend(
            staged
                .iter()
                .filter(|((k, _), _)| *k == kind)
                .map(|(_, e)| e)
                .filter(|e| predicate.map_or(true, |p| p(e)))
                .cloned(),
        );
        Ok(rows)
    }

    fn put(&self, entity: Entity) -> StoreResult<()> {
        let kind = entity.kind();
        let key = entity
            .key()
            .ok_or(StoreError::MissingKey(kind))?
            .to_string();
        self.lock()?.insert((kind, key), entity);
        Ok(())
    }
}
