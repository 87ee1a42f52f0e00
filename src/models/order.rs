use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions; a confirmation that
    /// arrives for a terminal order is acknowledged without side effects.
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Externally visible numeric identifier, distinct from the row id.
    /// Positive, unique, and small enough for the gateway's numeric range.
    pub order_code: i64,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub package_tier: String,
    pub duration_days: i64,
    /// VND, integral
    pub amount: i64,
    pub status: OrderStatus,
    pub payment_link_id: Option<String>,
    pub transaction_ref: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order row joined with its license, if one has been issued.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLicense {
    #[serde(flatten)]
    pub order: Order,
    pub license_key: Option<String>,
    pub license_expires_at: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Input for persisting a new pending order. The order code is allocated by
/// the store layer, not the caller.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub customer: CustomerInfo,
    pub package_tier: String,
    pub duration_days: i64,
    pub amount: i64,
}
