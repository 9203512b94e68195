//! # simplog Server
//!
//! HTTP ingestion and query server for schemaless log records.
//!
//! This crate provides:
//! - `GET /groups/{group}?...` filtered queries
//! - `POST /groups/{group}` batch appends
//! - JSON responses for every outcome, errors included
//! - The `simplog` binary
//!
//! # Query language
//!
//! Each query argument constrains one field. A `:int` or `:float` suffix
//! on the key converts the value; `[lower:upper]` selects the half-open
//! range `lower <= v < upper`, with either bound omittable:
//!
//! ```text
//! GET /groups/movie?title=Frozen
//! GET /groups/movie?year:int=[1980:2008]
//! GET /groups/sensor?temp:float=[:36.6]
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use simplog_server::{LogServer, ServerConfig};
//!
//! let config = ServerConfig::default().with_data_dir("/var/lib/simplog");
//! LogServer::open(config)?.run().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod encoder;
mod error;
mod handler;
mod request;
mod route;
mod server;

pub use config::{ServerConfig, DEFAULT_MAX_BODY_BYTES};
pub use encoder::{
    encode_logs, encode_record, AppendResponse, FailureResponse, JsonResponse, LogsResponse,
    CONTENT_TYPE_JSON,
};
pub use error::{ServerError, ServerResult};
pub use handler::{handle_request, HandlerContext};
pub use request::{parse_query, parse_records};
pub use route::{GroupAction, Route, GROUP_METHODS};
pub use server::LogServer;
