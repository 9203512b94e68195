//! Error types for the log server.

use crate::encoder::{FailureResponse, JsonResponse};
use crate::route::GROUP_METHODS;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use simplog_core::CoreError;
use simplog_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A query argument could not be decoded.
    #[error("invalid query: {0}")]
    InvalidQuery(CoreError),

    /// The query string could not be decoded.
    #[error("malformed query string: {0}")]
    MalformedQueryString(String),

    /// A POST body was not a JSON array of objects.
    #[error("malformed request body: {0}")]
    MalformedRequestBody(String),

    /// No resource lives at the requested path.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The resource exists but does not support the method.
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    /// The request body exceeded the configured limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// The store rejected or failed the operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A store call did not finish in time.
    #[error("store call timed out after {0:?}")]
    StoreTimeout(Duration),

    /// A response could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns the HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidQuery(_)
            | ServerError::MalformedQueryString(_)
            | ServerError::MalformedRequestBody(_) => StatusCode::BAD_REQUEST,
            ServerError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Store(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::StoreTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ServerError::Store(_)
            | ServerError::Encoding(_)
            | ServerError::Internal(_)
            | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let allow = matches!(self, ServerError::MethodNotAllowed(_));
        let mut response =
            JsonResponse::with_status(status, FailureResponse::new(&self)).into_response();
        if allow {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(GROUP_METHODS));
        }
        response
    }
}
