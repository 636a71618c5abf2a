//! HTTP surface tests
//!
//! Exercise routing, extraction, and validation short-circuits. The pool is
//! lazily connected and never touched: every request here is rejected before
//! any query runs.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tower::util::ServiceExt;

use ledger_api::api;

fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@127.0.0.1/ledger_unused")
        .expect("valid database url");
    api::create_router().with_state(pool)
}

async fn error_code(response: axum::response::Response) -> (StatusCode, String) {
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json["error_code"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_health_check() {
    let response = test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_app()
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_account_rejects_blank_document_number() {
    let req = Request::builder()
        .method("POST")
        .uri("/accounts")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"document_number": "   "}"#))
        .unwrap();

    let response = test_app().oneshot(req).await.unwrap();
    let (status, code) = error_code(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code, "invalid_request");
}

#[tokio::test]
async fn test_create_account_rejects_long_document_number() {
    let req = Request::builder()
        .method("POST")
        .uri("/accounts")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"document_number": "12345678901"}"#))
        .unwrap();

    let response = test_app().oneshot(req).await.unwrap();
    let (status, code) = error_code(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code, "invalid_request");
}

#[tokio::test]
async fn test_transaction_requires_idempotency_key_header() {
    let req = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("content-type", "application/json")
        .body(Body::from(
            r#"{"account_id": 1, "operation_type_id": 4, "amount": 10.00}"#,
        ))
        .unwrap();

    let response = test_app().oneshot(req).await.unwrap();
    let (status, code) = error_code(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code, "missing_header");
}

#[tokio::test]
async fn test_transaction_rejects_blank_idempotency_key() {
    let req = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("content-type", "application/json")
        .header("Idempotency-Key", "   ")
        .body(Body::from(
            r#"{"account_id": 1, "operation_type_id": 4, "amount": 10.00}"#,
        ))
        .unwrap();

    let response = test_app().oneshot(req).await.unwrap();
    let (status, code) = error_code(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code, "missing_header");
}

#[tokio::test]
async fn test_transaction_rejects_nonpositive_amount() {
    for amount in ["-5.00", "0"] {
        let req = Request::builder()
            .method("POST")
            .uri("/transactions")
            .header("content-type", "application/json")
            .header("Idempotency-Key", "k1")
            .body(Body::from(format!(
                r#"{{"account_id": 1, "operation_type_id": 4, "amount": {}}}"#,
                amount
            )))
            .unwrap();

        let response = test_app().oneshot(req).await.unwrap();
        let (status, code) = error_code(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "invalid_request");
    }
}

#[tokio::test]
async fn test_transaction_rejects_subcent_amount() {
    let req = Request::builder()
        .method("POST")
        .uri("/transactions")
        .header("content-type", "application/json")
        .header("Idempotency-Key", "k1")
        .body(Body::from(
            r#"{"account_id": 1, "operation_type_id": 4, "amount": 10.005}"#,
        ))
        .unwrap();

    let response = test_app().oneshot(req).await.unwrap();
    let (status, code) = error_code(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(code, "invalid_request");
}
