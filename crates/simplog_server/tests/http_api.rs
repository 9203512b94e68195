//! Integration tests for the HTTP API.
//!
//! Requests go through the full router with `tower::ServiceExt::oneshot`,
//! so routing, extraction and encoding are all exercised.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value as Json};
use simplog_core::{Filter, LogRecord, RecordId};
use simplog_server::{LogServer, ServerConfig, CONTENT_TYPE_JSON, GROUP_METHODS};
use simplog_store::{DocumentStore, InMemoryStore, StoreError, StoreResult};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    allow: Option<String>,
    body: Json,
}

fn setup_test_app() -> Router {
    setup_with(ServerConfig::default())
}

fn setup_with(config: ServerConfig) -> Router {
    LogServer::new(config, Arc::new(InMemoryStore::new())).router()
}

async fn send(app: &Router, method: Method, uri: &str, body: impl Into<Body>) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    let header_text = |name: header::HeaderName| {
        response
            .headers()
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    };
    let status = response.status();
    let content_type = header_text(header::CONTENT_TYPE);
    let allow = header_text(header::ALLOW);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();
    TestResponse {
        status,
        content_type,
        allow,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, Body::empty()).await
}

async fn post(app: &Router, uri: &str, body: Json) -> TestResponse {
    send(app, Method::POST, uri, body.to_string()).await
}

fn ids(response: &TestResponse) -> Vec<String> {
    response.body["id"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap().to_string())
        .collect()
}

fn titles(response: &TestResponse) -> Vec<String> {
    response.body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|log| log["title"].as_str().unwrap().to_string())
        .collect()
}

async fn post_movies(app: &Router) {
    let movies = json!([
        {"title": "Ghostbusters", "year": 1984},
        {"title": "StarWars", "year": 1977},
        {"title": "DarkKnight", "year": 2008},
        {"title": "Empire", "year": 1980},
    ]);
    let response = post(app, "/groups/movie", movies).await;
    assert_eq!(response.body["success"], true);
}

// ============================================================================
// Append and query
// ============================================================================

#[tokio::test]
async fn test_post_then_query_round_trip() {
    let app = setup_test_app();

    let response = post(
        &app,
        "/groups/movie",
        json!([{"title": "Frozen", "message": "Let It Go"}]),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    let ids = ids(&response);
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].len(), 32);

    let response = get(&app, "/groups/movie?title=Frozen").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({"logs": [{"title": "Frozen", "message": "Let It Go", "_id": ids[0]}]})
    );
}

#[tokio::test]
async fn test_responses_are_json() {
    let app = setup_test_app();

    let response = get(&app, "/groups/movie").await;
    assert_eq!(response.content_type.as_deref(), Some(CONTENT_TYPE_JSON));

    let response = get(&app, "/nowhere").await;
    assert_eq!(response.content_type.as_deref(), Some(CONTENT_TYPE_JSON));
}

#[tokio::test]
async fn test_absent_group_has_no_logs() {
    let app = setup_test_app();
    let response = get(&app, "/groups/nothing?title=Frozen").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"logs": []}));
}

#[tokio::test]
async fn test_year_range_is_half_open() {
    let app = setup_test_app();
    post_movies(&app).await;

    let response = get(&app, "/groups/movie?year%3Aint=%5B1980%3A2008%5D").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(titles(&response), ["Ghostbusters", "Empire"]);
}

#[tokio::test]
async fn test_open_ended_ranges() {
    let app = setup_test_app();
    post_movies(&app).await;

    let response = get(&app, "/groups/movie?year:int=%5B:1980%5D").await;
    assert_eq!(titles(&response), ["StarWars"]);

    let response = get(&app, "/groups/movie?year:int=%5B1984:%5D").await;
    assert_eq!(titles(&response), ["Ghostbusters", "DarkKnight"]);
}

#[tokio::test]
async fn test_int_suffix_does_not_match_text() {
    let app = setup_test_app();
    post(
        &app,
        "/groups/mixed",
        json!([{"n": 5, "tag": "int"}, {"n": "5", "tag": "text"}]),
    )
    .await;

    let response = get(&app, "/groups/mixed?n:int=5").await;
    assert_eq!(response.body["logs"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["logs"][0]["tag"], "int");

    let response = get(&app, "/groups/mixed?n=5").await;
    assert_eq!(response.body["logs"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["logs"][0]["tag"], "text");
}

#[tokio::test]
async fn test_float_suffix() {
    let app = setup_test_app();
    post(&app, "/groups/sensor", json!([{"temp": 36.4}, {"temp": 38.1}])).await;

    let response = get(&app, "/groups/sensor?temp:float=%5B:37.5%5D").await;
    let logs = response.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["temp"], 36.4);
}

#[tokio::test]
async fn test_groups_are_isolated() {
    let app = setup_test_app();
    post(&app, "/groups/movie", json!([{"title": "Up"}])).await;
    post(&app, "/groups/game", json!([{"title": "Portal"}])).await;

    let response = get(&app, "/groups/movie").await;
    assert_eq!(titles(&response), ["Up"]);

    let response = get(&app, "/groups/game?title=Up").await;
    assert_eq!(response.body, json!({"logs": []}));
}

#[tokio::test]
async fn test_lookup_by_returned_id() {
    let app = setup_test_app();
    let response = post(&app, "/groups/movie", json!([{"title": "A"}, {"title": "B"}])).await;
    let ids = ids(&response);
    assert_eq!(ids.len(), 2);

    let response = get(&app, &format!("/groups/movie?_id={}", ids[1])).await;
    assert_eq!(titles(&response), ["B"]);
}

#[tokio::test]
async fn test_client_id_is_replaced() {
    let app = setup_test_app();
    let response = post(&app, "/groups/movie", json!([{"_id": "mine", "title": "A"}])).await;
    let ids = ids(&response);

    let response = get(&app, "/groups/movie?_id=mine").await;
    assert_eq!(response.body, json!({"logs": []}));

    let response = get(&app, "/groups/movie").await;
    assert_eq!(response.body["logs"][0]["_id"], ids[0].as_str());
}

#[tokio::test]
async fn test_first_query_value_wins() {
    let app = setup_test_app();
    post_movies(&app).await;

    let response = get(&app, "/groups/movie?title=Empire&title=StarWars").await;
    assert_eq!(titles(&response), ["Empire"]);
}

#[tokio::test]
async fn test_query_values_are_form_decoded() {
    let app = setup_test_app();
    post(&app, "/groups/movie", json!([{"title": "Star Wars"}])).await;

    let response = get(&app, "/groups/movie?title=Star+Wars").await;
    assert_eq!(titles(&response), ["Star Wars"]);

    let response = get(&app, "/groups/movie?title=Star%20Wars").await;
    assert_eq!(titles(&response), ["Star Wars"]);
}

#[tokio::test]
async fn test_nested_field_query() {
    let app = setup_test_app();
    post(
        &app,
        "/groups/access",
        json!([{"http": {"status": 404}}, {"http": {"status": 200}}]),
    )
    .await;

    let response = get(&app, "/groups/access?http.status:int=404").await;
    let logs = response.body["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["http"]["status"], 404);
}

#[tokio::test]
async fn test_empty_array_is_accepted() {
    let app = setup_test_app();
    let response = post(&app, "/groups/movie", json!([])).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"success": true, "id": []}));
}

#[tokio::test]
async fn test_trailing_slash_is_accepted() {
    let app = setup_test_app();
    let response = post(&app, "/groups/movie/", json!([{"title": "Up"}])).await;
    assert_eq!(response.body["success"], true);

    let response = get(&app, "/groups/movie/?title=Up").await;
    assert_eq!(titles(&response), ["Up"]);
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_invalid_int_is_bad_request() {
    let app = setup_test_app();
    let response = get(&app, "/groups/movie?year:int=abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert!(response.body["error"].as_str().unwrap().contains("year:int"));
}

#[tokio::test]
async fn test_range_without_bounds_is_bad_request() {
    let app = setup_test_app();
    let response = get(&app, "/groups/movie?year:int=%5B:%5D").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_query_is_bad_request() {
    let app = setup_test_app();
    post(&app, "/groups/movie", json!([{"title": "Frozen"}])).await;

    for uri in ["/groups/movie?title=%FF%FE", "/groups/movie?title=%zz"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(response.body["success"], false, "uri: {uri}");
        assert!(
            response.body["error"].as_str().unwrap().contains("malformed query string"),
            "uri: {uri}"
        );
    }
}

#[tokio::test]
async fn test_malformed_bodies_report_failure() {
    let app = setup_test_app();

    for body in ["not json", r#"{"title": "Frozen"}"#, r#"[{"title": "Frozen"}, 42]"#] {
        let response = send(&app, Method::POST, "/groups/movie", body).await;
        assert_eq!(response.status, StatusCode::OK, "body: {body}");
        assert_eq!(response.body["success"], false, "body: {body}");
        assert!(response.body["error"].is_string(), "body: {body}");
    }

    // Nothing from the rejected batches was stored
    let response = get(&app, "/groups/movie").await;
    assert_eq!(response.body, json!({"logs": []}));
}

#[tokio::test]
async fn test_strict_body_errors() {
    let app = setup_with(ServerConfig::default().with_strict_body_errors(true));
    let response = send(&app, Method::POST, "/groups/movie", "not json").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_unknown_paths_are_not_found() {
    let app = setup_test_app();

    for path in ["/", "/groups", "/groups/", "/logs/movie", "/groups/movie/extra"] {
        let response = get(&app, path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "path: {path}");
        assert_eq!(
            response.body,
            json!({"success": false, "error": format!("resource not found: {path}")})
        );
    }
}

#[tokio::test]
async fn test_unsupported_method() {
    let app = setup_test_app();
    let response = send(&app, Method::PUT, "/groups/movie", "[]").await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.allow.as_deref(), Some(GROUP_METHODS));
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_invalid_group_name_is_bad_request() {
    let app = setup_test_app();
    let response = post(&app, "/groups/.hidden", json!([{"a": 1}])).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = setup_with(ServerConfig::default().with_max_body_bytes(64));
    let records: Vec<Json> = (0..32).map(|i| json!({"n": i, "pad": "xxxxxxxx"})).collect();
    let response = post(&app, "/groups/movie", Json::Array(records)).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.body["success"], false);
}

// ============================================================================
// Store behavior
// ============================================================================

struct SlowStore {
    delay: Duration,
}

impl DocumentStore for SlowStore {
    fn insert_many(&self, _group: &str, records: Vec<LogRecord>) -> StoreResult<Vec<RecordId>> {
        std::thread::sleep(self.delay);
        Ok(records.iter().map(|_| RecordId::new()).collect())
    }

    fn find(&self, _group: &str, _filter: &Filter) -> StoreResult<Vec<LogRecord>> {
        std::thread::sleep(self.delay);
        Ok(Vec::new())
    }
}

struct FailingStore;

impl DocumentStore for FailingStore {
    fn insert_many(&self, _group: &str, _records: Vec<LogRecord>) -> StoreResult<Vec<RecordId>> {
        Err(StoreError::Io(std::io::Error::other("disk on fire")))
    }

    fn find(&self, group: &str, _filter: &Filter) -> StoreResult<Vec<LogRecord>> {
        Err(StoreError::Corrupted {
            group: group.to_string(),
            line: 1,
            message: "truncated".into(),
        })
    }
}

#[tokio::test]
async fn test_slow_store_times_out() {
    let config = ServerConfig::default().with_store_timeout(Duration::from_millis(20));
    let store = Arc::new(SlowStore {
        delay: Duration::from_millis(300),
    });
    let app = LogServer::new(config, store).router();

    let response = get(&app, "/groups/movie").await;
    assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_store_failures_are_server_errors() {
    let app = LogServer::new(ServerConfig::default(), Arc::new(FailingStore)).router();

    let response = get(&app, "/groups/movie").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);

    let response = post(&app, "/groups/movie", json!([{"a": 1}])).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.body["error"].as_str().unwrap().contains("disk on fire"));
}

#[tokio::test]
async fn test_file_store_persists_across_servers() {
    let dir = TempDir::new().unwrap();
    let config = ServerConfig::default().with_data_dir(dir.path());

    let ids = {
        let app = LogServer::open(config.clone()).unwrap().router();
        let response = post(
            &app,
            "/groups/movie",
            json!([{"title": "Frozen", "year": 2013}]),
        )
        .await;
        ids(&response)
    };

    let app = LogServer::open(config).unwrap().router();
    let response = get(&app, "/groups/movie?year:int=%5B2000:%5D").await;
    assert_eq!(
        response.body,
        json!({"logs": [{"title": "Frozen", "year": 2013, "_id": ids[0]}]})
    );
}
