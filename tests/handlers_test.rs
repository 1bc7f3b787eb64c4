// HTTP routes over the in-memory store


use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use test_helpers::*;
use tower::ServiceExt;
use wallet_ledger_api::router;

fn app() -> Router {
    router(memory_state())
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_wallet(app: &Router) -> String {
    let (status, body) = send_json(app, Method::POST, "/wallet", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["wallet_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_create_and_get_wallet() {
    let app = app();
    let id = create_wallet(&app).await;
    assert_eq!(id.len(), 64);

    let (status, body) = send_json(&app, Method::GET, &format!("/wallet/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wallet_id"], id);
    assert_eq!(body["balance"], 0);
    assert_eq!(body["balance_formatted"], "0.00$");
}

#[tokio::test]
async fn test_get_unknown_wallet_is_not_found() {
    let (status, body) = send_json(&app(), Method::GET, "/wallet/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "WALLET_NOT_FOUND");
}

#[tokio::test]
async fn test_deposit_and_transfer_flow() {
    let app = app();
    let a = create_wallet(&app).await;
    let b = create_wallet(&app).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/deposit/{}", a),
        Some(json!({ "amount": 1199 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "wallet_id": a, "balance": 1199 }));

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/transfer",
        Some(json!({ "from_wallet": a, "to_wallet": b, "amount": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "from_wallet": a, "to_wallet": b, "amount": 100 }));

    let (_, body) = send_json(&app, Method::GET, &format!("/wallet/{}", a), None).await;
    assert_eq!(body["balance_formatted"], "10.99$");
}

#[tokio::test]
async fn test_insufficient_funds_is_bad_request() {
    let app = app();
    let a = create_wallet(&app).await;
    let b = create_wallet(&app).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/transfer",
        Some(json!({ "from_wallet": a, "to_wallet": b, "amount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_FUNDS");
    assert_eq!(body["message"], "insufficient funds in the account");
}

#[tokio::test]
async fn test_malformed_bodies_are_bad_request() {
    let app = app();
    let a = create_wallet(&app).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/deposit/{}", a),
        Some(json!({ "amount": "ten" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/deposit/{}", a),
        Some(json!({ "amount": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/transfer",
        Some(json!({ "from_wallet": "", "to_wallet": a, "amount": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_report_formats() {
    let app = app();
    let a = create_wallet(&app).await;
    send(
        &app,
        Method::POST,
        &format!("/deposit/{}", a),
        Some(json!({ "amount": 250 })),
    )
    .await;

    let (status, body) = send_json(&app, Method::POST, &format!("/report/{}/json", a), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["operation_type"], "deposit");
    assert_eq!(body[0]["amount"], "2.50$");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/report/{}/csv", a),
        Some(json!({ "operation_type": "deposit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("wallet_id,operation_id,amount,date\n"));
    assert!(text.contains(&format!("{},deposit,2.50$,", a)));

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/report/{}/csv", a),
        Some(json!({ "operation_type": "withdraw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_report_rejections() {
    let app = app();
    let a = create_wallet(&app).await;

    let (status, body) = send_json(&app, Method::POST, &format!("/report/{}/xml", a), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_EXPORT_FORMAT");

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/report/{}/json", a),
        Some(json!({ "from_date": "2030-02-01", "to_date": "2030-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DATE_RANGE");

    let (status, body) = send_json(
        &app,
        Method::POST,
        &format!("/report/{}/json", a),
        Some(json!({ "to_date": "01-01-2030" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DATE_FORMAT");
}
