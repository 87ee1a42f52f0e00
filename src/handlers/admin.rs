use axum::extract::State;
use serde::Serialize;

use crate::db::{queries, AppState};
use crate::error::Result;
use crate::extractors::Json;
use crate::models::OrderWithLicense;

#[derive(Debug, Serialize)]
pub struct OrdersListResponse {
    pub orders: Vec<OrderWithLicense>,
}

/// GET /admin/orders - every order with its license key, newest first.
/// Feeds the operator dashboard; run this service behind a reverse proxy
/// that restricts the /admin prefix.
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<OrdersListResponse>> {
    let conn = state.db.get()?;
    let orders = queries::list_orders_with_licenses(&conn)?;
    Ok(Json(OrdersListResponse { orders }))
}
