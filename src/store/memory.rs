//! In-process store backing the admin daemon.

use dashmap::DashMap;

use crate::entity::{Entity, EntityKind};
use crate::store::{Predicate, Store, StoreError, StoreResult};

/// A concurrent map of `(kind, key) -> entity`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<(EntityKind, String), Entity>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.iter().filter(|r| r.key().0 == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, kind: EntityKind, id: &str) -> StoreResult<Entity> {
        self.entries
            .get(&(kind, id.to_string()))
            .map(|r| r.value().clone())
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_string(),
            })
    }

    fn list(&self, kind: EntityKind, predicate: Option<Predicate<'_>>) -> StoreResult<Vec<Entity>> {
        let mut rows: Vec<(i64, String, Entity)> = self
            .entries
            .iter()
            .filter(|r| r.key().0 == kind)
            .filter(|r| predicate.map_or(true, |p| p(r.value())))
            .map(|r| (r.value().create_time(), r.key().1.clone(), r.value().clone()))
            .collect();

        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(rows.into_iter().map(|(_, _, entity)| entity).collect())
    }

    fn put(&self, entity: Entity) -> StoreResult<()> {
        let kind = entity.kind();
        let key = entity
            .key()
            .ok_or(StoreError::MissingKey(kind))?
            .to_string();
        self.entries.insert((kind, key), entity);
        Ok(())
    }
}
