//! Request handlers for group endpoints.

use crate::config::ServerConfig;
use crate::encoder::{encode_logs, AppendResponse, FailureResponse, JsonResponse};
use crate::error::{ServerError, ServerResult};
use crate::request::{parse_query, parse_records};
use crate::route::{GroupAction, Route};
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use simplog_core::build_filter;
use simplog_store::{DocumentStore, StoreResult};
use std::sync::Arc;

/// Context shared by every request.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    store: Arc<dyn DocumentStore>,
}

impl HandlerContext {
    /// Creates a new handler context.
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self { config, store }
    }

    /// Returns the backing store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Runs a store call on the blocking pool, bounded by the store timeout.
    async fn run_store<T, F>(&self, op: F) -> ServerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let timeout = self.config.store_timeout;
        let task = tokio::task::spawn_blocking(move || op(store.as_ref()));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result.map_err(ServerError::from),
            Ok(Err(e)) => Err(ServerError::Internal(format!("store task failed: {e}"))),
            Err(_) => Err(ServerError::StoreTimeout(timeout)),
        }
    }

    /// Answers a query on a group.
    ///
    /// Repeated query keys keep their first value.
    pub async fn handle_query(&self, group: String, uri: &Uri) -> ServerResult<Response> {
        let pairs = parse_query(uri.query())?;
        let filter = build_filter(pairs).map_err(ServerError::InvalidQuery)?;
        tracing::debug!(group = %group, constraints = filter.constraints().len(), "query");

        let records = self
            .run_store(move |store| store.find(&group, &filter))
            .await?;
        Ok(JsonResponse::ok(encode_logs(&records)?).into_response())
    }

    /// Appends the records in a POST body to a group.
    ///
    /// A malformed body is answered with a failure body and status 200,
    /// or 400 when strict body errors are configured.
    pub async fn handle_append(&self, group: String, body: &[u8]) -> ServerResult<Response> {
        let records = match parse_records(body) {
            Ok(records) => records,
            Err(e) if !self.config.strict_body_errors => {
                tracing::warn!(group = %group, error = %e, "rejected request body");
                return Ok(JsonResponse::ok(FailureResponse::new(&e)).into_response());
            }
            Err(e) => return Err(e),
        };

        if records.is_empty() {
            return Ok(JsonResponse::ok(AppendResponse::success(&[])).into_response());
        }

        let count = records.len();
        let log_group = group.clone();
        let ids = self
            .run_store(move |store| store.insert_many(&group, records))
            .await?;
        tracing::info!(group = %log_group, inserted = count, "appended records");

        Ok(JsonResponse::ok(AppendResponse::success(&ids)).into_response())
    }
}

/// Entry point for every request.
///
/// Resolves the path, then dispatches on the method. A body rejection
/// only matters to appends, so it is looked at after routing.
pub async fn handle_request(
    State(context): State<Arc<HandlerContext>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    tracing::debug!(%method, path = uri.path(), "request");

    let result = match Route::resolve(uri.path()) {
        Route::NotFound | Route::GroupsCollection => {
            Err(ServerError::ResourceNotFound(uri.path().to_string()))
        }
        Route::Group(group) => match GroupAction::from_method(&method) {
            Some(GroupAction::Query) => context.handle_query(group, &uri).await,
            Some(GroupAction::Append) => match body {
                Ok(body) => context.handle_append(group, &body).await,
                Err(rejection) => Err(body_rejection(rejection)),
            },
            None => Err(ServerError::MethodNotAllowed(method.to_string())),
        },
    };

    result.unwrap_or_else(IntoResponse::into_response)
}

fn body_rejection(rejection: BytesRejection) -> ServerError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::MalformedRequestBody(rejection.body_text())
    }
}
