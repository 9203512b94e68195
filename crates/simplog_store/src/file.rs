//! File-based document store for persistent groups.

use crate::error::{StoreError, StoreResult};
use crate::store::{validate_group_name, DocumentStore};
use parking_lot::RwLock;
use serde_json::{Map, Value as Json};
use simplog_core::{Filter, LogRecord, RecordId, Value, ID_FIELD};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

const GROUP_FILE_EXTENSION: &str = "jsonl";

/// A file-based document store.
///
/// Each group is one JSON-lines file (`<group>.jsonl`) under the data
/// directory, one record per line. Identifiers are written as their
/// 32-digit hex form and restored to [`RecordId`] when the file is read.
///
/// # Durability
///
/// `insert_many` appends the whole batch, then calls `sync_data()` before
/// returning. A batch that fails part-way is truncated off the file again
/// and leaves the in-memory view untouched.
///
/// # Caching
///
/// A group file is read once, on first access, and kept in memory after
/// that. Groups without a file are not cached until something is inserted.
/// The store assumes it is the only writer of its directory.
///
/// # Example
///
/// ```no_run
/// use simplog_core::{Filter, LogRecord};
/// use simplog_store::{DocumentStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("/var/lib/simplog")).unwrap();
/// store
///     .insert_many("movie", vec![LogRecord::from_fields([("title", "Frozen")])])
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    groups: RwLock<HashMap<String, Vec<LogRecord>>>,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        tracing::info!(dir = %dir.display(), "opened file store");
        Ok(Self {
            dir: dir.to_path_buf(),
            groups: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn group_path(&self, group: &str) -> PathBuf {
        self.dir.join(format!("{group}.{GROUP_FILE_EXTENSION}"))
    }

    /// Reads a group file. Returns `None` if the group has no file.
    fn load_group(&self, group: &str) -> StoreResult<Option<Vec<LogRecord>>> {
        let file = match File::open(self.group_path(group)) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let corrupted = |message: String| StoreError::Corrupted {
                group: group.to_string(),
                line: index + 1,
                message,
            };
            let json: Json = serde_json::from_str(&line).map_err(|e| corrupted(e.to_string()))?;
            records.push(decode_record(json).map_err(corrupted)?);
        }

        tracing::debug!(group, records = records.len(), "loaded group file");
        Ok(Some(records))
    }

    /// Runs `f` over the cached group, loading it first if needed.
    ///
    /// A group without a file is seen as empty and stays out of the cache.
    fn with_group<T>(&self, group: &str, f: impl FnOnce(&[LogRecord]) -> T) -> StoreResult<T> {
        if let Some(records) = self.groups.read().get(group) {
            return Ok(f(records));
        }
        let Some(loaded) = self.load_group(group)? else {
            return Ok(f(&[]));
        };
        let mut groups = self.groups.write();
        let records = groups.entry(group.to_string()).or_insert(loaded);
        Ok(f(records))
    }
}

impl DocumentStore for FileStore {
    fn insert_many(&self, group: &str, records: Vec<LogRecord>) -> StoreResult<Vec<RecordId>> {
        validate_group_name(group)?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(records.len());
        let mut stored = Vec::with_capacity(records.len());
        let mut buffer = Vec::new();
        for mut record in records {
            let id = RecordId::new();
            record.set_id(id);
            serde_json::to_writer(&mut buffer, &encode_record(&record)?)
                .map_err(|e| StoreError::Encoding(e.to_string()))?;
            buffer.push(b'\n');
            ids.push(id);
            stored.push(record);
        }

        // Hold the write lock across the append so batches never interleave.
        let mut groups = self.groups.write();
        if !groups.contains_key(group) {
            let loaded = self.load_group(group)?.unwrap_or_default();
            groups.insert(group.to_string(), loaded);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.group_path(group))?;
        append_or_rollback(&file, |mut file| {
            file.write_all(&buffer)?;
            file.sync_data()
        })?;

        groups.entry(group.to_string()).or_default().extend(stored);
        tracing::debug!(group, inserted = ids.len(), "appended records to group file");
        Ok(ids)
    }

    fn find(&self, group: &str, filter: &Filter) -> StoreResult<Vec<LogRecord>> {
        validate_group_name(group)?;
        self.with_group(group, |records| {
            records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect()
        })
    }
}

/// Runs `write` against a group file, truncating the file back to its prior
/// length if the write fails.
fn append_or_rollback(
    file: &File,
    write: impl FnOnce(&File) -> io::Result<()>,
) -> io::Result<()> {
    let prev_len = file.metadata()?.len();
    if let Err(e) = write(file) {
        if let Err(rollback) = file.set_len(prev_len) {
            tracing::error!(error = %rollback, "failed to roll back partial append");
        }
        return Err(e);
    }
    Ok(())
}

/// Encodes a record as one JSON object, the identifier as hex text.
fn encode_record(record: &LogRecord) -> StoreResult<Json> {
    let mut map = Map::with_capacity(record.len());
    for (name, value) in record.iter() {
        let json = match value {
            Value::Id(id) => Json::String(id.to_string()),
            other => other
                .to_json()
                .map_err(|e| StoreError::Encoding(format!("field {name:?}: {e}")))?,
        };
        map.insert(name.to_string(), json);
    }
    Ok(Json::Object(map))
}

fn decode_record(json: Json) -> Result<LogRecord, String> {
    let mut record = LogRecord::try_from(json).map_err(|e| e.to_string())?;
    let id = match record.get(ID_FIELD) {
        Some(Value::Text(text)) => text.parse::<RecordId>().map_err(|e| e.to_string())?,
        Some(other) => return Err(format!("{ID_FIELD} is a {}, expected text", other.kind())),
        None => return Err(format!("record has no {ID_FIELD}")),
    };
    record.insert(ID_FIELD, Value::Id(id));
    Ok(record)
}
