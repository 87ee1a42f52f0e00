use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection};

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{
    query_all, query_one, ACTIVATION_COLS, LICENSE_COLS, ORDER_COLS,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

/// True when an INSERT failed because a uniqueness constraint fired.
/// The order-code and license-key allocators retry on this; everything else
/// propagates.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============ Orders ============

const ORDER_CODE_ATTEMPTS: usize = 5;

/// Millisecond timestamp spread with a random suffix. Positive, collision-
/// resistant under bursts, and well inside the gateway's numeric range
/// (PayOS order codes must fit a JavaScript safe integer).
fn gen_order_code() -> i64 {
    let millis = Utc::now().timestamp_millis();
    millis * 1000 + rand::thread_rng().gen_range(0..1000)
}

/// Persist a pending order with a freshly allocated order code.
///
/// The UNIQUE constraint on order_code is the arbiter against concurrent
/// allocation; a violation gets a new code and another attempt rather than
/// surfacing to the client.
pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let now = now();

    for _ in 0..ORDER_CODE_ATTEMPTS {
        let order_code = gen_order_code();
        let inserted = conn.execute(
            "INSERT INTO orders (order_code, customer_email, customer_phone, package_tier,
                                 duration_days, amount, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                order_code,
                &input.customer.email,
                &input.customer.phone,
                &input.package_tier,
                input.duration_days,
                input.amount,
                OrderStatus::Pending.as_ref(),
                now,
                now
            ],
        );

        match inserted {
            Ok(_) => {
                return Ok(Order {
                    id: conn.last_insert_rowid(),
                    order_code,
                    customer_email: input.customer.email.clone(),
                    customer_phone: input.customer.phone.clone(),
                    package_tier: input.package_tier.clone(),
                    duration_days: input.duration_days,
                    amount: input.amount,
                    status: OrderStatus::Pending,
                    payment_link_id: None,
                    transaction_ref: None,
                    created_at: now,
                    updated_at: now,
                });
            }
            Err(e) if is_unique_violation(&e) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Conflict(
        "Could not allocate a unique order code".into(),
    ))
}

pub fn get_order_by_code(conn: &Connection, order_code: i64) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE order_code = ?1", ORDER_COLS),
        &[&order_code],
    )
}

pub fn get_order_with_license(
    conn: &Connection,
    order_code: i64,
) -> Result<Option<OrderWithLicense>> {
    let cols: String = ORDER_COLS
        .split(", ")
        .map(|c| format!("o.{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    query_one(
        conn,
        &format!(
            "SELECT {}, l.license_key, l.expires_at
             FROM orders o
             LEFT JOIN licenses l ON l.order_id = o.id
             WHERE o.order_code = ?1",
            cols
        ),
        &[&order_code],
    )
}

pub fn list_orders_with_licenses(conn: &Connection) -> Result<Vec<OrderWithLicense>> {
    let cols: String = ORDER_COLS
        .split(", ")
        .map(|c| format!("o.{}", c))
        .collect::<Vec<_>>()
        .join(", ");
    query_all(
        conn,
        &format!(
            "SELECT {}, l.license_key, l.expires_at
             FROM orders o
             LEFT JOIN licenses l ON l.order_id = o.id
             ORDER BY o.created_at DESC",
            cols
        ),
        &[],
    )
}

pub fn set_order_payment_link(
    conn: &Connection,
    order_id: i64,
    payment_link_id: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET payment_link_id = ?2, updated_at = ?3 WHERE id = ?1",
        params![order_id, payment_link_id, now()],
    )?;
    Ok(affected > 0)
}

/// pending -> completed. Returns false when the order was already terminal;
/// the guard makes terminal states one-way regardless of caller checks.
pub fn complete_order(
    conn: &Connection,
    order_id: i64,
    transaction_ref: Option<&str>,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = 'completed', transaction_ref = ?2, updated_at = ?3
         WHERE id = ?1 AND status = 'pending'",
        params![order_id, transaction_ref, now()],
    )?;
    Ok(affected > 0)
}

/// pending -> cancelled. Same guard as `complete_order`.
pub fn cancel_order(conn: &Connection, order_id: i64) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET status = 'cancelled', updated_at = ?2
         WHERE id = ?1 AND status = 'pending'",
        params![order_id, now()],
    )?;
    Ok(affected > 0)
}

// ============ Licenses ============

/// Insert a license row. A duplicate key propagates as a Database error the
/// issuer detects with `is_unique_violation` and retries with a fresh key;
/// an existing row is never overwritten.
pub fn insert_license(
    conn: &Connection,
    key: &str,
    order_id: i64,
    package_tier: &str,
    duration_days: i64,
    activated_at: i64,
    expires_at: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO licenses (license_key, order_id, package_tier, duration_days,
                               activated_at, expires_at, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            key,
            order_id,
            package_tier,
            duration_days,
            activated_at,
            expires_at,
            LicenseStatus::Active.as_ref(),
            now()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_license_by_key(conn: &Connection, license_key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE license_key = ?1", LICENSE_COLS),
        &[&license_key],
    )
}

pub fn get_active_license_by_key(conn: &Connection, license_key: &str) -> Result<Option<License>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM licenses WHERE license_key = ?1 AND status = 'active'",
            LICENSE_COLS
        ),
        &[&license_key],
    )
}

pub fn get_license_for_order(conn: &Connection, order_id: i64) -> Result<Option<License>> {
    query_one(
        conn,
        &format!("SELECT {} FROM licenses WHERE order_id = ?1", LICENSE_COLS),
        &[&order_id],
    )
}

pub fn count_licenses_for_order(conn: &Connection, order_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM licenses WHERE order_id = ?1",
        params![order_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

// ============ Activations ============

/// Atomically claim the license for a machine: compare-and-set from NULL.
/// Succeeds when the license is unbound or already bound to this machine;
/// returns false (zero rows) when another machine holds the binding. Two
/// simultaneous first activations from different machines race on this
/// single UPDATE, so exactly one wins.
pub fn bind_machine(conn: &Connection, license_key: &str, machine_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE licenses SET bound_machine_id = ?2
         WHERE license_key = ?1
           AND (bound_machine_id IS NULL OR bound_machine_id = ?2)",
        params![license_key, machine_id],
    )?;
    Ok(affected > 0)
}

/// Record the activation pair. INSERT OR IGNORE against the unique index, so
/// re-activation on the same machine never adds a second row.
pub fn record_activation(conn: &Connection, license_key: &str, machine_id: &str) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO activations (license_key, machine_id, activated_at)
         VALUES (?1, ?2, ?3)",
        params![license_key, machine_id, now()],
    )?;
    Ok(())
}

pub fn list_activations(conn: &Connection, license_key: &str) -> Result<Vec<Activation>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM activations WHERE license_key = ?1 ORDER BY activated_at",
            ACTIVATION_COLS
        ),
        &[&license_key],
    )
}

pub fn count_activations(conn: &Connection, license_key: &str) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM activations WHERE license_key = ?1",
        params![license_key],
        |row| row.get(0),
    )?;
    Ok(count)
}
