mod admin;
mod licenses;
mod orders;
mod packages;
mod pages;
mod webhook;

pub use admin::*;
pub use licenses::*;
pub use orders::*;
pub use packages::*;
pub use pages::*;
pub use webhook::*;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::db::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/packages", get(list_packages))
        .route("/orders", post(create_order))
        .route("/orders/{code}", get(get_order))
        .route("/payments/notify", post(payment_notify))
        .route("/licenses/activate", post(activate_license))
        .route("/licenses/{key}", get(get_license))
        .route("/admin/orders", get(list_orders))
        .route("/payment/success", get(payment_success))
        .route("/payment/cancel", get(payment_cancel))
}
