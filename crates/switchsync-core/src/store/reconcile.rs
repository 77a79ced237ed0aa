// ── Natural-key reconciliation ──
//
// Upserts freshly normalized child rows for one device. Matching is by
// natural key scoped to the device; a match keeps its id and creation
// time and has its tracked fields overwritten. Nothing is pruned: rows a
// device stops reporting stay until the device itself is removed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Stored;
use super::collection::EntityCollection;
use crate::model::{EntityId, NaturalKey};

/// Per-kind outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl ReconcileSummary {
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }
}

pub(crate) fn child_key(device_id: EntityId, natural_key: &str) -> String {
    format!("{device_id}/{natural_key}")
}

/// Upsert `items` for `device_id` into `collection`.
///
/// Rows whose fields already match are left alone, timestamps included,
/// so re-applying the same fact set is a no-op. Duplicate natural keys
/// within `items` collapse to the last occurrence.
pub(crate) fn reconcile<T>(
    collection: &EntityCollection<Stored<T>>,
    device_id: EntityId,
    items: Vec<T>,
    now: DateTime<Utc>,
    mut next_id: impl FnMut() -> EntityId,
) -> ReconcileSummary
where
    T: NaturalKey + PartialEq + Send + Sync + 'static,
{
    let mut summary = ReconcileSummary::default();
    let mut pending: BTreeMap<String, Stored<T>> = BTreeMap::new();

    for item in items {
        let key = child_key(device_id, &item.natural_key());

        if let Some(staged) = pending.get_mut(&key) {
            staged.data = item;
            continue;
        }

        match collection.get_by_key(&key) {
            Some(existing) if existing.data == item => summary.unchanged += 1,
            Some(existing) => {
                summary.updated += 1;
                pending.insert(
                    key,
                    Stored {
                        id: existing.id,
                        device_id,
                        data: item,
                        created_at: existing.created_at,
                        updated_at: now,
                    },
                );
            }
            None => {
                summary.inserted += 1;
                pending.insert(
                    key,
                    Stored {
                        id: next_id(),
                        device_id,
                        data: item,
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
    }

    collection.upsert_many(
        pending
            .into_iter()
            .map(|(key, stored)| (key, stored.id, stored)),
    );
    summary
}
