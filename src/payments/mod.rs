mod payos;

pub use payos::*;

use serde::{Deserialize, Serialize};

/// One line item on a checkout. PayOS displays these on the hosted page.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutItem {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
}

/// Everything the gateway needs to build a hosted checkout page.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_code: i64,
    /// Must equal the item total; mismatches are rejected, not corrected.
    pub amount: i64,
    pub description: String,
    pub items: Vec<CheckoutItem>,
    pub return_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
    pub payment_link_id: String,
}

/// Raw inbound webhook body. `data` stays untyped until the signature over
/// its canonical encoding has been verified.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub code: String,
    #[allow(dead_code)]
    pub desc: String,
    pub data: serde_json::Value,
    pub signature: String,
}

/// Typed view of the webhook `data` object, parsed after authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    pub order_code: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub transaction_date_time: Option<String>,
}

impl WebhookData {
    /// The gateway's transaction reference, falling back to the transaction
    /// timestamp for older payload versions that lack `reference`.
    pub fn transaction_ref(&self) -> Option<String> {
        self.reference
            .clone()
            .or_else(|| self.transaction_date_time.clone())
    }
}
