//! # simplog Store
//!
//! Document store boundary and implementations for simplog.
//!
//! The server treats the store as an opaque collaborator with two
//! operations: insert a batch of records into a group, and find the
//! records of a group that match a [`simplog_core::Filter`].
//!
//! ## Available Stores
//!
//! - [`InMemoryStore`] - For testing and ephemeral servers
//! - [`FileStore`] - One JSON-lines file per group under a data directory
//!
//! ## Example
//!
//! ```rust
//! use simplog_core::{build_filter, LogRecord};
//! use simplog_store::{DocumentStore, InMemoryStore};
//!
//! let store = InMemoryStore::new();
//! store
//!     .insert_many("movie", vec![LogRecord::from_fields([("year", 1984i64)])])
//!     .unwrap();
//!
//! let filter = build_filter([("year:int", "[1980:2008]")]).unwrap();
//! assert_eq!(store.find("movie", &filter).unwrap().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use store::{validate_group_name, DocumentStore};
