//! Schemaless log record.

use crate::error::{CoreError, CoreResult};
use crate::id::RecordId;
use crate::value::{json_kind, Value};
use serde_json::Value as Json;

/// Name of the field that carries the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// A log record: an ordered mapping from field name to [`Value`].
///
/// Records have no schema. Field order is preserved from the posted JSON;
/// the identifier field is appended last when the store assigns it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogRecord {
    fields: Vec<(String, Value)>,
}

impl LogRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from ordered field pairs.
    ///
    /// Later duplicates of a field name replace earlier ones in place.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut record = Self::new();
        for (name, value) in fields {
            record.insert(name, value);
        }
        record
    }

    /// Returns the value of a top-level field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Resolves a field path.
    ///
    /// A literal top-level field wins; otherwise `a.b.c` walks nested maps.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.get(path) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        segments.try_fold(self.get(first)?, |value, segment| value.get(segment))
    }

    /// Sets a field, replacing an existing value in place.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Returns the store-assigned identifier, if the record has one.
    pub fn id(&self) -> Option<RecordId> {
        self.get(ID_FIELD).and_then(Value::as_id)
    }

    /// Assigns the identifier, moving the field to the end of the record.
    pub fn set_id(&mut self, id: RecordId) {
        self.remove(ID_FIELD);
        self.fields.push((ID_FIELD.to_string(), Value::Id(id)));
    }

    /// Iterates over fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consumes the record, returning its ordered fields.
    pub fn into_fields(self) -> Vec<(String, Value)> {
        self.fields
    }
}

impl TryFrom<Json> for LogRecord {
    type Error = CoreError;

    fn try_from(json: Json) -> CoreResult<Self> {
        match json {
            Json::Object(map) => Ok(Self {
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            other => Err(CoreError::NotAnObject {
                found: json_kind(&other),
            }),
        }
    }
}

impl From<LogRecord> for Value {
    fn from(record: LogRecord) -> Self {
        Value::Map(record.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_object() {
        let record = LogRecord::try_from(json!({"title": "Frozen", "year": 2013})).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("title"), Some(&Value::from("Frozen")));
        assert_eq!(record.get("year"), Some(&Value::Integer(2013)));
    }

    #[test]
    fn from_json_rejects_non_object() {
        let err = LogRecord::try_from(json!([1, 2])).unwrap_err();
        assert_eq!(err, CoreError::NotAnObject { found: "array" });
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut record = LogRecord::from_fields([("a", 1i64), ("b", 2i64)]);
        let old = record.insert("a", 10i64);
        assert_eq!(old, Some(Value::Integer(1)));
        let names: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn set_id_moves_field_last() {
        let mut record = LogRecord::from_fields([("_id", "client"), ("title", "Frozen")]);
        let id = RecordId::new();
        record.set_id(id);

        let names: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["title", "_id"]);
        assert_eq!(record.id(), Some(id));
    }

    #[test]
    fn lookup_nested_path() {
        let record = LogRecord::try_from(json!({
            "request": {"path": "/home", "status": {"code": 200}},
            "a.b": "literal"
        }))
        .unwrap();

        assert_eq!(record.lookup("request.path"), Some(&Value::from("/home")));
        assert_eq!(record.lookup("request.status.code"), Some(&Value::Integer(200)));
        assert_eq!(record.lookup("a.b"), Some(&Value::from("literal")));
        assert_eq!(record.lookup("request.missing"), None);
        assert_eq!(record.lookup("nothing"), None);
    }

    #[test]
    fn remove_field() {
        let mut record = LogRecord::from_fields([("a", 1i64)]);
        assert_eq!(record.remove("a"), Some(Value::Integer(1)));
        assert!(record.is_empty());
        assert_eq!(record.remove("a"), None);
    }
}
