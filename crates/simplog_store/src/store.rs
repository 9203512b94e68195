//! Document store trait definition.

use crate::error::{StoreError, StoreResult};
use simplog_core::{Filter, LogRecord, RecordId};

/// The document store behind simplog.
///
/// A store holds named groups of schemaless records. It is an opaque
/// collaborator: the server only ever inserts batches and finds by filter.
///
/// # Invariants
///
/// - `insert_many` creates the group on demand
/// - `insert_many` returns one identifier per input record, in input order,
///   and every stored record carries its identifier in the `_id` field
/// - `find` on a group that does not exist returns an empty result
/// - `find` returns records in insertion order, without limit
/// - Stores must be `Send + Sync`; they are shared across request workers
///   and synchronize internally
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing and ephemeral servers
/// - [`super::FileStore`] - JSON-lines files under a data directory
pub trait DocumentStore: Send + Sync {
    /// Inserts records into a group, assigning each a fresh identifier.
    ///
    /// A client-supplied `_id` field is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the group name is unusable or the write fails.
    fn insert_many(&self, group: &str, records: Vec<LogRecord>) -> StoreResult<Vec<RecordId>>;

    /// Returns every record of the group that matches the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the group name is unusable or the group cannot
    /// be read.
    fn find(&self, group: &str, filter: &Filter) -> StoreResult<Vec<LogRecord>>;
}

/// Checks that a group name is safe to use as a file name.
///
/// Accepted names are non-empty, consist of ASCII letters, digits, `_`,
/// `-` and `.`, and do not start with `.`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidGroupName`] otherwise.
pub fn validate_group_name(group: &str) -> StoreResult<()> {
    let valid = !group.is_empty()
        && !group.starts_with('.')
        && group
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidGroupName(group.to_string()))
    }
}
