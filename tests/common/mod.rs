//! Shared helpers: an app over `MemoryStore` and request shortcuts.

#![allow(dead_code)]

use astro_catalog::{app, AppState, AuthConfig, MemoryStore};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub fn test_app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        AuthConfig::new(SECRET),
        "Astronomical Catalog API",
    );
    app(state)
}

/// Response status and JSON body (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
    }
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    read(response).await
}

pub async fn read(response: axum::http::Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body), None).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None, None).await
}

/// POST a urlencoded form and return the raw response.
pub async fn post_form(app: &Router, uri: &str, form: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn create_body(app: &Router, name: &str, body_type: &str) -> i64 {
    let (status, body) = post(
        app,
        "/celestial-bodies/",
        json!({ "name": name, "body_type": body_type }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_astronomer(app: &Router, first: &str, last: &str) -> i64 {
    let (status, body) = post(
        app,
        "/astronomers/",
        json!({ "first_name": first, "last_name": last }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

pub async fn create_observation(app: &Router, astronomer_id: i64, celestial_body_id: i64) -> i64 {
    let (status, body) = post(
        app,
        "/observations/",
        json!({
            "astronomer_id": astronomer_id,
            "celestial_body_id": celestial_body_id,
            "observation_date": "2024-03-10T21:30:00Z"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}
