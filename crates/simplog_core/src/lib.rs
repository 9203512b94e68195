//! # simplog Core
//!
//! Record model and query layer for simplog.
//!
//! This crate provides:
//! - [`Value`] and [`LogRecord`], the schemaless record model
//! - [`RecordId`], the store-native record identifier
//! - Query argument decoding (`field[:int|:float]=value|[lower:upper]`)
//! - [`Filter`] construction and evaluation
//!
//! ## Example
//!
//! ```rust
//! use simplog_core::{build_filter, LogRecord};
//! use serde_json::json;
//!
//! let filter = build_filter([("year:int", "[1980:2008]")]).unwrap();
//! let record = LogRecord::try_from(json!({"title": "Ghostbusters", "year": 1984})).unwrap();
//! assert!(filter.matches(&record));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod id;
mod query;
mod record;
mod value;

pub use error::{CoreError, CoreResult};
pub use id::RecordId;
pub use query::{
    build_filter, decode_argument, decode_arguments, Condition, Constraint, FieldConstraint,
    Filter, FilterBuilder, QueryPredicate, Scalar, ValueType,
};
pub use record::{LogRecord, ID_FIELD};
pub use value::{json_kind, Value};
