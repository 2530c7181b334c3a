#![allow(dead_code)]

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::Utc;
use ivrmon_server::app;
use ivrmon_server::config::ServerConfig;
use ivrmon_server::state::AppState;
use ivrmon_storage::store::SqliteIvrStore;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

/// Router over a fresh store in a temp directory, no vendor account
/// configured (the report endpoint therefore serves sample data).
pub fn build_test_context() -> Result<TestContext> {
    let temp_dir = tempfile::tempdir()?;
    let store = Arc::new(SqliteIvrStore::new(&temp_dir.path().join("ivr_data.db"))?);
    let config = ServerConfig::default();
    let state = AppState {
        store,
        telephony: None,
        config: Arc::new(config),
        start_time: Utc::now(),
    };
    let app = app::build_http_app(state.clone());
    Ok(TestContext {
        temp_dir,
        state,
        app,
    })
}

/// Drives one request through the router; returns status, parsed JSON
/// body (Null when empty) and the X-Trace-Id header.
pub async fn request_no_body(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Value, Option<String>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    run(app, request).await
}

/// Like [`request_no_body`] but with an urlencoded form body, the way
/// the vendor delivers POST notifications.
pub async fn request_form(
    app: &axum::Router,
    method: &str,
    uri: &str,
    form: &str,
) -> (StatusCode, Value, Option<String>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("request should build");
    run(app, request).await
}

async fn run(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let trace_id = response
        .headers()
        .get("X-Trace-Id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, body, trace_id)
}
