//! Record identifier.

use crate::error::CoreError;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-generated identifier of a log record.
///
/// Record IDs are 128-bit random UUIDs that are:
/// - Unique within a store
/// - Assigned once, at insertion
/// - Never reused
///
/// They are not a JSON type; the textual form (32 lowercase hex digits)
/// is what clients see.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId([u8; 16]);

impl RecordId {
    /// Creates a record ID from raw bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Returns the raw bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({self})")
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid().simple())
    }
}

impl FromStr for RecordId {
    type Err = CoreError;

    /// Accepts the simple (32 hex digit) form as well as the hyphenated one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s)
            .map(|uuid| Self(uuid.into_bytes()))
            .map_err(|_| CoreError::InvalidRecordId(s.to_string()))
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }
}
