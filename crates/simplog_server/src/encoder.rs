//! Response encoding.
//!
//! Every body the server produces is JSON with
//! `Content-Type: application/json; charset=utf-8`:
//!
//! - query results: `{"logs": [...]}`
//! - successful append: `{"success": true, "id": ["...", ...]}`
//! - any failure: `{"success": false, "error": "..."}`

use crate::error::{ServerError, ServerResult};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use simplog_core::{CoreResult, LogRecord, RecordId, Value};

/// Content type of every response body.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Body of a query response.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    /// Matching records.
    pub logs: Vec<Json>,
}

/// Body of a successful append.
#[derive(Debug, Serialize)]
pub struct AppendResponse {
    /// Always true.
    pub success: bool,
    /// Identifiers of the inserted records, in request order.
    pub id: Vec<String>,
}

impl AppendResponse {
    /// Builds the response for a set of inserted records.
    pub fn success(ids: &[RecordId]) -> Self {
        Self {
            success: true,
            id: ids.iter().map(RecordId::to_string).collect(),
        }
    }
}

/// Body of a failed request.
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    /// Always false.
    pub success: bool,
    /// What went wrong.
    pub error: String,
}

impl FailureResponse {
    /// Builds a failure body from any displayable error.
    pub fn new(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: error.to_string(),
        }
    }
}

/// A serializable body paired with its status code.
#[derive(Debug)]
pub struct JsonResponse<T> {
    status: StatusCode,
    body: T,
}

impl<T: Serialize> JsonResponse<T> {
    /// A 200 response.
    pub fn ok(body: T) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    /// A response with an explicit status.
    pub fn with_status(status: StatusCode, body: T) -> Self {
        Self { status, body }
    }
}

impl<T: Serialize> IntoResponse for JsonResponse<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec(&self.body) {
            Ok(bytes) => (
                self.status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON))],
                bytes,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON))],
                    r#"{"success":false,"error":"response serialization failed"}"#,
                )
                    .into_response()
            }
        }
    }
}

/// Text form of a value JSON cannot hold directly.
///
/// Identifiers use their hex form; non-finite floats their Rust spelling
/// (`NaN`, `inf`, `-inf`). Anything else has no fallback.
fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Id(id) => Some(id.to_string()),
        Value::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Converts a value to JSON, stringifying leaves that have no JSON form.
///
/// When a leaf cannot be stringified either, the conversion
/// error is returned.
fn encode_value(value: &Value) -> CoreResult<Json> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(encode_value)
            .collect::<CoreResult<Vec<_>>>()
            .map(Json::Array),
        Value::Map(pairs) => {
            let mut map = Map::with_capacity(pairs.len());
            for (key, value) in pairs {
                map.insert(key.clone(), encode_value(value)?);
            }
            Ok(Json::Object(map))
        }
        leaf => leaf
            .to_json()
            .or_else(|err| stringify(leaf).map(Json::String).ok_or(err)),
    }
}

/// Encodes one record as a JSON object.
///
/// # Errors
///
/// Fails if a field holds a value with neither a JSON nor a text form.
pub fn encode_record(record: &LogRecord) -> ServerResult<Json> {
    let mut map = Map::with_capacity(record.len());
    for (name, value) in record.iter() {
        let json = encode_value(value)
            .map_err(|e| ServerError::Encoding(format!("field {name:?}: {e}")))?;
        map.insert(name.to_string(), json);
    }
    Ok(Json::Object(map))
}

/// Encodes query results.
///
/// # Errors
///
/// Fails if any record cannot be encoded.
pub fn encode_logs(records: &[LogRecord]) -> ServerResult<LogsResponse> {
    let logs = records
        .iter()
        .map(encode_record)
        .collect::<ServerResult<Vec<_>>>()?;
    Ok(LogsResponse { logs })
}
