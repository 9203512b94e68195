//! Request parsing: query strings and POST bodies.

use crate::error::{ServerError, ServerResult};
use percent_encoding::percent_decode_str;
use serde_json::Value as Json;
use simplog_core::{json_kind, LogRecord};

/// Splits a query string into decoded `(key, value)` pairs, in order.
///
/// Decoding follows `application/x-www-form-urlencoded`: `+` is a space and
/// `%XX` an escaped byte. Unlike lenient form decoders, a broken escape or
/// a byte sequence that is not UTF-8 is an error rather than being passed
/// through or replaced.
///
/// # Errors
///
/// Returns [`ServerError::MalformedQueryString`] for an undecodable key or
/// value.
pub fn parse_query(query: Option<&str>) -> ServerResult<Vec<(String, String)>> {
    query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(text: &str) -> ServerResult<String> {
    let malformed =
        |reason: &str| ServerError::MalformedQueryString(format!("{text:?}: {reason}"));

    let bytes = text.as_bytes();
    for (index, _) in text.match_indices('%') {
        let escape = bytes.get(index + 1..index + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(malformed("invalid percent escape"));
        }
    }

    let spaced = text.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| malformed("not valid UTF-8"))
}

/// Parses a POST body into records.
///
/// The body must be a JSON array whose elements are all objects. Field
/// order inside each object is kept.
///
/// # Errors
///
/// Returns [`ServerError::MalformedRequestBody`] if the body is not JSON,
/// is not an array, or holds a non-object element.
pub fn parse_records(body: &[u8]) -> ServerResult<Vec<LogRecord>> {
    let json: Json = serde_json::from_slice(body)
        .map_err(|e| ServerError::MalformedRequestBody(format!("invalid JSON: {e}")))?;

    let Json::Array(items) = json else {
        return Err(ServerError::MalformedRequestBody(format!(
            "expected a JSON array, found {}",
            json_kind(&json)
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            LogRecord::try_from(item)
                .map_err(|e| ServerError::MalformedRequestBody(format!("element {index}: {e}")))
        })
        .collect()
}
