//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupt data.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str = "id, order_code, customer_email, customer_phone, package_tier, duration_days, amount, status, payment_link_id, transaction_ref, created_at, updated_at";

pub const LICENSE_COLS: &str = "id, license_key, order_id, package_tier, duration_days, activated_at, expires_at, status, bound_machine_id, created_at";

pub const ACTIVATION_COLS: &str = "id, license_key, machine_id, activated_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            order_code: row.get(1)?,
            customer_email: row.get(2)?,
            customer_phone: row.get(3)?,
            package_tier: row.get(4)?,
            duration_days: row.get(5)?,
            amount: row.get(6)?,
            status: parse_enum(row, 7, "status")?,
            payment_link_id: row.get(8)?,
            transaction_ref: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

/// Expects ORDER_COLS (qualified) followed by the license's key and expiry.
impl FromRow for OrderWithLicense {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(OrderWithLicense {
            order: Order::from_row(row)?,
            license_key: row.get(12)?,
            license_expires_at: row.get(13)?,
        })
    }
}

impl FromRow for License {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(License {
            id: row.get(0)?,
            license_key: row.get(1)?,
            order_id: row.get(2)?,
            package_tier: row.get(3)?,
            duration_days: row.get(4)?,
            activated_at: row.get(5)?,
            expires_at: row.get(6)?,
            status: parse_enum(row, 7, "status")?,
            bound_machine_id: row.get(8)?,
            created_at: row.get(9)?,
        })
    }
}

impl FromRow for Activation {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Activation {
            id: row.get(0)?,
            license_key: row.get(1)?,
            machine_id: row.get(2)?,
            activated_at: row.get(3)?,
        })
    }
}
