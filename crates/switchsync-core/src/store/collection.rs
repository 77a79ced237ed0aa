// ── Generic entity collection ──
//
// Concurrent keyed storage with a secondary id index. Readers take a
// snapshot (cheap `Arc` clone) that is rebuilt once per mutation batch.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// A concurrent collection for a single entity type.
///
/// `DashMap` gives per-shard locking so syncs of different devices never
/// contend on the same row. The snapshot is kept sorted by key so listings
/// and the persisted file are stable.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    /// Primary storage: natural key -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Secondary index: EntityId -> key.
    id_to_key: DashMap<EntityId, String>,

    /// Reverse of `id_to_key` for removal.
    key_to_id: DashMap<String, EntityId>,

    /// Sorted snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            id_to_key: DashMap::new(),
            key_to_id: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, id: EntityId, entity: T) -> bool {
        let is_new = self.insert(key, id, entity);
        self.rebuild_snapshot();
        is_new
    }

    /// Insert or replace many entities with a single snapshot rebuild.
    pub(crate) fn upsert_many(&self, items: impl IntoIterator<Item = (String, EntityId, T)>) {
        let mut touched = false;
        for (key, id, entity) in items {
            self.insert(key, id, entity);
            touched = true;
        }
        if touched {
            self.rebuild_snapshot();
        }
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.detach(key);
        if removed.is_some() {
            self.rebuild_snapshot();
        }
        removed
    }

    /// Remove every entity matching `pred`. Returns how many were removed.
    pub(crate) fn remove_where(&self, pred: impl Fn(&T) -> bool) -> usize {
        let doomed: Vec<String> = self
            .by_key
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.key().clone())
            .collect();
        for key in &doomed {
            self.detach(key);
        }
        if !doomed.is_empty() {
            self.rebuild_snapshot();
        }
        doomed.len()
    }

    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_id(&self, id: EntityId) -> Option<Arc<T>> {
        let key = self.id_to_key.get(&id)?;
        self.by_key
            .get(key.value().as_str())
            .map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot, sorted by key.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn insert(&self, key: String, id: EntityId, entity: T) -> bool {
        // Drop a stale id mapping if the key is re-used under a new id.
        if let Some(old_id) = self.key_to_id.get(&key).map(|r| *r.value()) {
            if old_id != id {
                self.id_to_key.remove(&old_id);
            }
        }

        let is_new = self.by_key.insert(key.clone(), Arc::new(entity)).is_none();
        self.id_to_key.insert(id, key.clone());
        self.key_to_id.insert(key, id);
        is_new
    }

    fn detach(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if let Some((_, id)) = self.key_to_id.remove(key) {
            self.id_to_key.remove(&id);
        }
        removed
    }

    fn rebuild_snapshot(&self) {
        // Collected under the sender's lock so concurrent rebuilds publish
        // in order. `send_modify` updates even with zero receivers.
        self.snapshot.send_modify(|snap| {
            let mut entries: Vec<(String, Arc<T>)> = self
                .by_key
                .iter()
                .map(|r| (r.key().clone(), Arc::clone(r.value())))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            *snap = Arc::new(entries.into_iter().map(|(_, v)| v).collect());
        });
    }
}
