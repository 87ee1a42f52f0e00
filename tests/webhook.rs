//! Payment notification handling: signature authentication, the
//! pending -> completed/cancelled transitions, and idempotency under
//! webhook redelivery.

use chrono::{Days, Utc};
use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn paid_notification_completes_the_order_and_issues_one_license() {
    let state = create_test_app_state();
    let order = {
        let mut conn = state.db.get().unwrap();
        create_pending_order(&mut conn, "3months")
    };
    let app = app(state.clone());

    let body = signed_webhook_body(
        &state.payos,
        "00",
        paid_webhook_data(order.order_code, order.amount),
    );
    let (status, ack) = post_json(&app, "/payments/notify", body).await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(ack["ack"], true);

    let conn = state.db.get().unwrap();
    let updated = queries::get_order_by_code(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Completed);
    assert_eq!(updated.transaction_ref.as_deref(), Some("FT22TEST0001"));

    let license = queries::get_license_for_order(&conn, order.id)
        .unwrap()
        .expect("license should have been issued");
    assert_eq!(license.duration_days, 90);
    assert_eq!(license.package_tier, "3months");
    assert_eq!(license.status, LicenseStatus::Active);

    // Expiry is 90 calendar days out from issuance.
    let expected = Utc::now()
        .checked_add_days(Days::new(90))
        .unwrap()
        .timestamp();
    assert!((license.expires_at - expected).abs() < 3600);

    // Release the single pooled connection before making another request.
    drop(conn);

    // The public order view now exposes the key.
    let (status, view) = get_json(&app, &format!("/orders/{}", order.order_code)).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(view["status"], "completed");
    assert_eq!(view["license_key"], license.license_key);
}

#[tokio::test]
async fn redelivered_success_notification_issues_no_second_license() {
    let state = create_test_app_state();
    let order = {
        let mut conn = state.db.get().unwrap();
        create_pending_order(&mut conn, "1month")
    };
    let app = app(state.clone());

    let body = signed_webhook_body(
        &state.payos,
        "00",
        paid_webhook_data(order.order_code, order.amount),
    );

    for _ in 0..3 {
        let (status, ack) = post_json(&app, "/payments/notify", body.clone()).await;
        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(ack["ack"], true);
    }

    let conn = state.db.get().unwrap();
    assert_eq!(queries::count_licenses_for_order(&conn, order.id).unwrap(), 1);
}

#[tokio::test]
async fn invalid_signature_is_rejected_with_no_state_change() {
    let state = create_test_app_state();
    let order = {
        let mut conn = state.db.get().unwrap();
        create_pending_order(&mut conn, "3months")
    };
    let app = app(state.clone());

    let mut body = signed_webhook_body(
        &state.payos,
        "00",
        paid_webhook_data(order.order_code, order.amount),
    );
    body["signature"] = json!("0000000000000000000000000000000000000000000000000000000000000000");

    let (status, _) = post_json(&app, "/payments/notify", body).await;
    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);

    let conn = state.db.get().unwrap();
    let order = queries::get_order_by_code(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(queries::count_licenses_for_order(&conn, order.id).unwrap(), 0);
}

#[tokio::test]
async fn failed_payment_cancels_the_order_terminally() {
    let state = create_test_app_state();
    let order = {
        let mut conn = state.db.get().unwrap();
        create_pending_order(&mut conn, "6months")
    };
    let app = app(state.clone());

    let data = json!({
        "orderCode": order.order_code,
        "amount": order.amount,
        "status": "CANCELLED",
    });
    let body = signed_webhook_body(&state.payos, "01", data);
    let (status, ack) = post_json(&app, "/payments/notify", body).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(ack["ack"], true);

    {
        let conn = state.db.get().unwrap();
        let cancelled = queries::get_order_by_code(&conn, order.order_code)
            .unwrap()
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    // A late success notification for a cancelled order is acknowledged but
    // must not resurrect it or issue a license.
    let late = signed_webhook_body(
        &state.payos,
        "00",
        paid_webhook_data(order.order_code, order.amount),
    );
    let (status, ack) = post_json(&app, "/payments/notify", late).await;
    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(ack["ack"], true);

    let conn = state.db.get().unwrap();
    let still = queries::get_order_by_code(&conn, order.order_code)
        .unwrap()
        .unwrap();
    assert_eq!(still.status, OrderStatus::Cancelled);
    assert_eq!(queries::count_licenses_for_order(&conn, order.id).unwrap(), 0);
}

#[tokio::test]
async fn unknown_order_code_is_acknowledged() {
    // PayOS sends connectivity probes with synthetic order codes; an error
    // status would make it retry forever.
    let state = create_test_app_state();
    let app = app(state.clone());

    let body = signed_webhook_body(&state.payos, "00", paid_webhook_data(123, 10_000));
    let (status, ack) = post_json(&app, "/payments/notify", body).await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(ack["ack"], true);
}
