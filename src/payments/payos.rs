//! PayOS payment gateway client.
//!
//! Outbound: create hosted checkout links. Inbound: verify webhook
//! signatures. Signatures are HMAC-SHA256 over the sorted-key `k=v&k=v`
//! canonical encoding of the `data` object, excluding the signature field.

use std::time::Duration;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::PayOsConfig;
use crate::error::{AppError, Result};

use super::{CheckoutRequest, CheckoutSession};

type HmacSha256 = Hmac<Sha256>;

/// Gateway calls are synchronous blocking I/O from the caller's point of
/// view; this bound guarantees an order can't sit in limbo longer than 30s.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentLinkRequest<'a> {
    order_code: i64,
    amount: i64,
    description: &'a str,
    items: &'a [super::CheckoutItem],
    return_url: &'a str,
    cancel_url: &'a str,
}

/// The one response shape we accept. Anything else is an upstream contract
/// violation, reported as a typed error instead of probed for alternates.
#[derive(Debug, Deserialize)]
struct PayOsEnvelope {
    code: String,
    desc: String,
    data: Option<PayOsPaymentLink>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayOsPaymentLink {
    checkout_url: String,
    payment_link_id: String,
}

#[derive(Debug, Clone)]
pub struct PayOsClient {
    client: Client,
    config: PayOsConfig,
}

impl PayOsClient {
    pub fn new(config: &PayOsConfig) -> Self {
        let client = Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .expect("failed to build http client");
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Create a hosted checkout page for an order.
    ///
    /// The order amount must equal the item total; a mismatch is a caller
    /// bug and fails validation here rather than being silently corrected.
    /// Gateway timeouts and non-2xx responses surface as `Upstream` and
    /// leave the order untouched (still pending, retryable).
    pub async fn create_payment_link(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        if !self.config.is_configured() {
            return Err(AppError::Upstream(
                "PayOS credentials are not configured".into(),
            ));
        }

        let item_total: i64 = request.items.iter().map(|i| i.price * i.quantity).sum();
        if item_total != request.amount {
            return Err(AppError::BadRequest(format!(
                "Order amount {} does not match item total {}",
                request.amount, item_total
            )));
        }

        let body = CreatePaymentLinkRequest {
            order_code: request.order_code,
            amount: request.amount,
            description: &request.description,
            items: &request.items,
            return_url: &request.return_url,
            cancel_url: &request.cancel_url,
        };

        let response = self
            .client
            .post(format!("{}/payment-requests", self.config.api_url))
            .header("x-client-id", &self.config.client_id)
            .header("x-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "PayOS returned {}: {}",
                status, text
            )));
        }

        let envelope: PayOsEnvelope = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unexpected PayOS response shape: {}", e)))?;

        if envelope.code != "00" {
            return Err(AppError::Upstream(format!(
                "PayOS rejected payment link ({}): {}",
                envelope.code, envelope.desc
            )));
        }

        let link = envelope.data.ok_or_else(|| {
            AppError::Upstream("PayOS response missing payment link data".into())
        })?;

        Ok(CheckoutSession {
            checkout_url: link.checkout_url,
            payment_link_id: link.payment_link_id,
        })
    }

    /// Compute the checksum for a webhook `data` object.
    pub fn sign(&self, data: &Value) -> String {
        let mut mac = HmacSha256::new_from_slice(self.config.checksum_key.as_bytes())
            .expect("hmac accepts any key length");
        mac.update(canonicalize(data).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify an inbound webhook signature in constant time.
    pub fn verify_signature(&self, data: &Value, signature: &str) -> bool {
        let expected = self.sign(data);
        let provided = signature.to_lowercase();
        bool::from(expected.as_bytes().ct_eq(provided.as_bytes()))
    }
}

/// Sorted-key `k=v&k=v` encoding of a JSON object. Nulls encode as empty
/// strings, strings are used raw, and nested values keep their compact JSON
/// form. The signature field never appears in `data`, so nothing is skipped.
fn canonicalize(data: &Value) -> String {
    let Value::Object(map) = data else {
        return data.to_string();
    };

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    keys.into_iter()
        .map(|k| {
            let v = match &map[k] {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}={}", k, v)
        })
        .collect::<Vec<_>>()
        .join("&")
}
