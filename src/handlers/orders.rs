use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::lifecycle::{self, OrderCreated};
use crate::models::{find_package, CustomerInfo, OrderStatus};
use crate::payments::{CheckoutItem, CheckoutRequest};

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub package_tier: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order_id: i64,
    pub order_code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_link_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub is_trial: bool,
}

/// POST /orders - create an order for a package tier.
///
/// Free tiers come back with a license immediately. Paid tiers get a
/// checkout URL from the gateway; if the gateway call fails the order stays
/// pending and a 502 surfaces, so the client can retry without creating a
/// second order.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>> {
    let customer = CustomerInfo {
        email: request.customer_email.clone(),
        phone: request.customer_phone.clone(),
    };

    let created = {
        let mut conn = state.db.get()?;
        lifecycle::create_order(&mut conn, &request.package_tier, customer)?
    };

    let order = match created {
        OrderCreated::Completed { order, license } => {
            tracing::info!(
                "trial license {} issued for order {}",
                license.license_key,
                order.order_code
            );
            return Ok(Json(CreateOrderResponse {
                order_id: order.id,
                order_code: order.order_code,
                payment_link: None,
                payment_link_id: None,
                license_key: Some(license.license_key),
                expires_at: Some(license.expires_at),
                is_trial: true,
            }));
        }
        OrderCreated::Pending(order) => order,
    };

    // Tier was validated by create_order; the unwrap-free lookup is for the
    // display name.
    let package = find_package(&order.package_tier)
        .ok_or_else(|| AppError::Internal("Package tier vanished from the table".into()))?;

    let checkout = CheckoutRequest {
        order_code: order.order_code,
        amount: order.amount,
        description: format!("{} license", package.name),
        items: vec![CheckoutItem {
            name: package.name.to_string(),
            quantity: 1,
            price: package.price,
        }],
        return_url: format!(
            "{}/payment/success?order_code={}",
            state.base_url, order.order_code
        ),
        cancel_url: format!(
            "{}/payment/cancel?order_code={}",
            state.base_url, order.order_code
        ),
    };

    let session = state.payos.create_payment_link(&checkout).await?;

    {
        let conn = state.db.get()?;
        queries::set_order_payment_link(&conn, order.id, &session.payment_link_id)?;
    }

    Ok(Json(CreateOrderResponse {
        order_id: order.id,
        order_code: order.order_code,
        payment_link: Some(session.checkout_url),
        payment_link_id: Some(session.payment_link_id),
        license_key: None,
        expires_at: None,
        is_trial: false,
    }))
}

#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    pub order_code: i64,
    pub status: OrderStatus,
    pub package_tier: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub created_at: i64,
}

/// GET /orders/{code} - order status plus the license key once issued.
pub async fn get_order(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> Result<Json<OrderStatusResponse>> {
    let conn = state.db.get()?;

    let found = queries::get_order_with_license(&conn, code)?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    Ok(Json(OrderStatusResponse {
        order_code: found.order.order_code,
        status: found.order.status,
        package_tier: found.order.package_tier,
        amount: found.order.amount,
        license_key: found.license_key,
        expires_at: found.license_expires_at,
        created_at: found.order.created_at,
    }))
}
