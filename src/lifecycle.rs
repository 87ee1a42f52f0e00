//! Order/payment lifecycle: the state machine that turns a paid order into
//! exactly one license.
//!
//! Orders move `pending -> completed` or `pending -> cancelled` and never
//! leave a terminal state. `confirm_payment` is safe under arbitrary webhook
//! redelivery: the order status is the idempotency gate, re-checked inside an
//! immediate transaction so concurrent deliveries serialize.

use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::licensing::{issuer, IssuedLicense};
use crate::models::{find_package, CreateOrder, CustomerInfo, Order, OrderStatus};

/// Result of creating an order. Free tiers skip the gateway entirely and
/// come back already completed, license in hand.
#[derive(Debug)]
pub enum OrderCreated {
    Pending(Order),
    Completed {
        order: Order,
        license: IssuedLicense,
    },
}

pub fn create_order(
    conn: &mut Connection,
    tier_id: &str,
    customer: CustomerInfo,
) -> Result<OrderCreated> {
    let package = find_package(tier_id)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid package tier: {}", tier_id)))?;

    let input = CreateOrder {
        customer,
        package_tier: package.id.to_string(),
        duration_days: package.duration_days,
        amount: package.price,
    };

    if package.price == 0 {
        // No payment round trip: issue and complete atomically.
        let tx = conn.transaction()?;
        let mut order = queries::create_order(&tx, &input)?;
        let license = issuer::issue(&tx, order.id, &order.package_tier, order.duration_days)?;
        queries::complete_order(&tx, order.id, None)?;
        tx.commit()?;

        order.status = OrderStatus::Completed;
        return Ok(OrderCreated::Completed { order, license });
    }

    let order = queries::create_order(conn, &input)?;
    Ok(OrderCreated::Pending(order))
}

/// An authenticated, parsed gateway notification. Signature verification
/// happens at the HTTP boundary; by the time this struct exists the payload
/// is trusted.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    pub order_code: i64,
    pub paid: bool,
    pub transaction_ref: Option<String>,
}

#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Payment succeeded; a license was issued and the order completed.
    Issued { order: Order, license: IssuedLicense },
    /// Payment failed or was abandoned; the order is cancelled.
    Cancelled(Order),
    /// The order was already terminal. Acknowledged with no side effects.
    AlreadyProcessed(Order),
    /// No such order code. Acknowledged (gateways send connectivity probes
    /// with synthetic order codes) but nothing is processed.
    UnknownOrder,
}

pub fn confirm_payment(
    conn: &mut Connection,
    confirmation: &PaymentConfirmation,
) -> Result<ConfirmOutcome> {
    // Immediate transaction: takes the write lock before the status read, so
    // two concurrent deliveries of the same notification cannot both observe
    // 'pending' and double-issue.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Some(order) = queries::get_order_by_code(&tx, confirmation.order_code)? else {
        return Ok(ConfirmOutcome::UnknownOrder);
    };

    if order.status.is_terminal() {
        return Ok(ConfirmOutcome::AlreadyProcessed(order));
    }

    if confirmation.paid {
        let license = issuer::issue(&tx, order.id, &order.package_tier, order.duration_days)?;
        queries::complete_order(&tx, order.id, confirmation.transaction_ref.as_deref())?;
        tx.commit()?;

        let mut order = order;
        order.status = OrderStatus::Completed;
        order.transaction_ref = confirmation.transaction_ref.clone();
        Ok(ConfirmOutcome::Issued { order, license })
    } else {
        queries::cancel_order(&tx, order.id)?;
        tx.commit()?;

        let mut order = order;
        order.status = OrderStatus::Cancelled;
        Ok(ConfirmOutcome::Cancelled(order))
    }
}
