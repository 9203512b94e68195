//! In-memory document store.

use crate::error::StoreResult;
use crate::store::{validate_group_name, DocumentStore};
use parking_lot::RwLock;
use simplog_core::{Filter, LogRecord, RecordId};
use std::collections::HashMap;

/// An in-memory document store.
///
/// This store keeps all groups in memory and is suitable for:
/// - Unit and integration tests
/// - Ephemeral servers that don't need persistence
///
/// # Thread Safety
///
/// Groups live behind a single reader-writer lock; concurrent finds
/// proceed in parallel, inserts are serialized.
///
/// # Example
///
/// ```rust
/// use simplog_core::{Filter, LogRecord};
/// use simplog_store::{DocumentStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// let ids = store
///     .insert_many("movie", vec![LogRecord::from_fields([("title", "Frozen")])])
///     .unwrap();
/// assert_eq!(ids.len(), 1);
/// assert_eq!(store.find("movie", &Filter::all()).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    groups: RwLock<HashMap<String, Vec<LogRecord>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of all groups, sorted.
    #[must_use]
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.groups.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of records in a group.
    #[must_use]
    pub fn count(&self, group: &str) -> usize {
        self.groups.read().get(group).map_or(0, Vec::len)
    }
}

impl DocumentStore for InMemoryStore {
    fn insert_many(&self, group: &str, records: Vec<LogRecord>) -> StoreResult<Vec<RecordId>> {
        validate_group_name(group)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(records.len());
        let mut groups = self.groups.write();
        let stored = groups.entry(group.to_string()).or_default();
        for mut record in records {
            let id = RecordId::new();
            record.set_id(id);
            stored.push(record);
            ids.push(id);
        }

        tracing::debug!(group, inserted = ids.len(), "inserted records");
        Ok(ids)
    }

    fn find(&self, group: &str, filter: &Filter) -> StoreResult<Vec<LogRecord>> {
        validate_group_name(group)?;
        let groups = self.groups.read();
        Ok(groups
            .get(group)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
