//! Integration tests for the license-notify endpoint.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn post_notify(app: Router, payload: &Value) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/license-notify")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn valid_payload() -> Value {
    json!({
        "token": TEST_NOTIFY_TOKEN,
        "email": "a@x.com",
        "license_key": "abcDEF234567ghjKLM89wxyz",
        "platform": "nt"
    })
}

#[tokio::test]
async fn test_invalid_json_rejected() {
    let kit = MockServer::start_async().await;
    let state = create_test_app_state(&kit.base_url());

    let response = app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/license-notify")
                .header("content-type", "application/json")
                .body(Body::from("{broken"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"invalid json");
}

#[tokio::test]
async fn test_wrong_token_unauthorized() {
    let kit = MockServer::start_async().await;
    let kit_mock = kit
        .mock_async(|when, then| {
            when.method(POST).path_contains("/subscribe");
            then.status(200).body("{}");
        })
        .await;
    let state = create_test_app_state(&kit.base_url());

    let mut payload = valid_payload();
    payload["token"] = json!("not-the-token");
    let (status, body) = post_notify(app(state), &payload).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, "unauthorized");
    assert_eq!(kit_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_absent_and_empty_tokens_unauthorized() {
    let kit = MockServer::start_async().await;
    let state = create_test_app_state(&kit.base_url());

    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("token");
    let (status, _) = post_notify(app(state.clone()), &payload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut payload = valid_payload();
    payload["token"] = json!("");
    let (status, _) = post_notify(app(state), &payload).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let kit = MockServer::start_async().await;
    let state = create_test_app_state(&kit.base_url());

    for field in ["email", "license_key", "platform"] {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove(field);
        let (status, body) = post_notify(app(state.clone()), &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {}", field);
        assert_eq!(body, "missing fields");

        // Whitespace-only is as good as missing
        let mut payload = valid_payload();
        payload[field] = json!("   ");
        let (status, _) = post_notify(app(state.clone()), &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "blank {}", field);
    }
}

#[tokio::test]
async fn test_forwards_subscriber_with_custom_fields() {
    let kit = MockServer::start_async().await;
    let kit_mock = kit
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("/v3/forms/{}/subscribe", TEST_KIT_FORM_ID))
                .json_body_partial(
                    r#"{
                        "api_key": "kit_test_key",
                        "email": "a@x.com",
                        "fields": { "license_key": "abcDEF234567ghjKLM89wxyz", "platform": "nt" }
                    }"#,
                );
            then.status(200).body(r#"{"subscription":{"id":1}}"#);
        })
        .await;
    let state = create_test_app_state(&kit.base_url());

    // Email arrives unnormalized; Kit must see it trimmed and lower-cased
    let mut payload = valid_payload();
    payload["email"] = json!("  A@X.com ");
    let (status, body) = post_notify(app(state), &payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
    assert_eq!(kit_mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_upstream_error_becomes_502_with_body() {
    let kit = MockServer::start_async().await;
    kit.mock_async(|when, then| {
        when.method(POST).path_contains("/subscribe");
        then.status(422).body(r#"{"error":"Form not found"}"#);
    })
    .await;
    let state = create_test_app_state(&kit.base_url());

    let (status, body) = post_notify(app(state), &valid_payload()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(
        body.starts_with("kit error:"),
        "body should carry the kit prefix: {}",
        body
    );
    assert!(
        body.contains("Form not found"),
        "upstream error text should be preserved: {}",
        body
    );
}

#[tokio::test]
async fn test_notifier_persists_nothing() {
    let kit = MockServer::start_async().await;
    kit.mock_async(|when, then| {
        when.method(POST).path_contains("/subscribe");
        then.status(200).body("{}");
    })
    .await;
    let state = create_test_app_state(&kit.base_url());

    post_notify(app(state.clone()), &valid_payload()).await;

    let conn = state.db.get().unwrap();
    assert_eq!(count_rows(&conn, "customers"), 0);
    assert_eq!(count_rows(&conn, "subscriptions"), 0);
    assert_eq!(count_rows(&conn, "licenses"), 0);
}
