//! Test utilities and fixtures for license-server integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::{json, Value};
use tower::ServiceExt;

pub use license_server::config::PayOsConfig;
pub use license_server::db::{init_db, queries, AppState};
pub use license_server::handlers;
pub use license_server::licensing::{self, IssuedLicense};
pub use license_server::lifecycle::{self, OrderCreated};
pub use license_server::models::*;
pub use license_server::payments::PayOsClient;

/// Gateway config with a fixed checksum key, so tests can sign their own
/// webhook payloads. The api_url points nowhere; nothing in the test suite
/// performs outbound gateway calls.
pub fn test_payos_config() -> PayOsConfig {
    PayOsConfig {
        client_id: "test-client-id".to_string(),
        api_key: "test-api-key".to_string(),
        checksum_key: "test-checksum-key".to_string(),
        api_url: "http://127.0.0.1:1".to_string(),
    }
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState backed by a single-connection in-memory pool.
/// max_size 1 keeps every request on the connection the schema was
/// initialized on (in-memory SQLite databases are per-connection).
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        base_url: "http://localhost:3000".to_string(),
        payos: PayOsClient::new(&test_payos_config()),
    }
}

/// Full router under test
pub fn app(state: AppState) -> Router {
    handlers::router().with_state(state)
}

/// Create a pending order for a tier straight through the lifecycle core.
pub fn create_pending_order(conn: &mut Connection, tier: &str) -> Order {
    match lifecycle::create_order(conn, tier, CustomerInfo::default())
        .expect("Failed to create test order")
    {
        OrderCreated::Pending(order) => order,
        OrderCreated::Completed { .. } => panic!("expected a paid tier, got a free one"),
    }
}

/// Issue a license directly against the store, bypassing the lifecycle.
pub fn issue_test_license(conn: &Connection, order_id: i64) -> IssuedLicense {
    licensing::issue(conn, order_id, "3months", 90).expect("Failed to issue test license")
}

/// A signed PayOS-style webhook body for the given data object.
pub fn signed_webhook_body(client: &PayOsClient, code: &str, data: Value) -> Value {
    let signature = client.sign(&data);
    json!({
        "code": code,
        "desc": if code == "00" { "success" } else { "failed" },
        "data": data,
        "signature": signature,
    })
}

/// Webhook data for a successful payment of an order.
pub fn paid_webhook_data(order_code: i64, amount: i64) -> Value {
    json!({
        "orderCode": order_code,
        "amount": amount,
        "status": "PAID",
        "reference": "FT22TEST0001",
        "transactionDateTime": "2026-08-30 10:00:00",
    })
}

/// POST a JSON body and return (status, parsed response body).
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// GET a URI and return (status, parsed response body).
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Current unix timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A timestamp `days` in the past
pub fn past_timestamp(days: i64) -> i64 {
    now() - days * 86400
}
