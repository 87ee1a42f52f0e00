use axum::extract::State;
use serde::Serialize;

use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::extractors::Json;
use crate::lifecycle::{self, ConfirmOutcome, PaymentConfirmation};
use crate::payments::{WebhookData, WebhookPayload};

#[derive(Debug, Serialize)]
pub struct NotifyAck {
    pub ack: bool,
    pub message: &'static str,
}

/// POST /payments/notify - inbound gateway notification.
///
/// Authentication first: the HMAC over the canonical `data` encoding must
/// match before anything is parsed or any order is touched. After that,
/// everything is ack'd with 200 - unknown order codes included, since the
/// gateway sends connectivity probes and will retry-storm on error statuses.
/// Redelivery of an already-processed notification is a no-op by design.
pub async fn payment_notify(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> Result<Json<NotifyAck>> {
    if !state.payos.verify_signature(&payload.data, &payload.signature) {
        tracing::warn!("rejected payment notification with invalid signature");
        return Err(AppError::BadRequest("Invalid signature".into()));
    }

    let data: WebhookData = serde_json::from_value(payload.data.clone())?;
    let paid = payload.code == "00" && data.status.as_deref() == Some("PAID");

    let confirmation = PaymentConfirmation {
        order_code: data.order_code,
        paid,
        transaction_ref: data.transaction_ref(),
    };

    let outcome = {
        let mut conn = state.db.get()?;
        lifecycle::confirm_payment(&mut conn, &confirmation)?
    };

    let message = match &outcome {
        ConfirmOutcome::Issued { order, license } => {
            tracing::info!(
                "license {} issued for order {}",
                license.license_key,
                order.order_code
            );
            "Payment processed successfully"
        }
        ConfirmOutcome::Cancelled(order) => {
            tracing::info!("order {} cancelled by gateway notification", order.order_code);
            "Payment cancelled or failed"
        }
        ConfirmOutcome::AlreadyProcessed(order) => {
            tracing::debug!("duplicate notification for order {}", order.order_code);
            "Order already processed"
        }
        ConfirmOutcome::UnknownOrder => {
            tracing::debug!("notification for unknown order {}", data.order_code);
            "Order not found"
        }
    };

    Ok(Json(NotifyAck { ack: true, message }))
}
