//! License issuance: key generation and the single write that creates a
//! license row.

use chrono::{DateTime, Days, Utc};
use rand::RngCore;
use rusqlite::Connection;

use crate::db::queries::{self, is_unique_violation};
use crate::error::{AppError, Result};

/// Attempts before giving up on a non-colliding key. With 3 random bytes per
/// day of issuance a collision is already vanishingly rare; hitting the limit
/// means something is wrong with the randomness source, not the keyspace.
const KEY_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct IssuedLicense {
    pub license_key: String,
    pub expires_at: i64,
}

/// Format: PAID-YYYYMMDD-XXXXXX (uppercase hex of 3 random bytes).
/// The date component makes keys auditable; the random suffix makes them
/// unguessable.
pub fn generate_license_key(issued_at: DateTime<Utc>) -> String {
    let mut suffix = [0u8; 3];
    rand::thread_rng().fill_bytes(&mut suffix);
    format!(
        "PAID-{}-{}",
        issued_at.format("%Y%m%d"),
        hex::encode_upper(suffix)
    )
}

/// Issue a license for an order: one new active row, expiring
/// `duration_days` calendar days after issuance (calendar arithmetic, so a
/// 90-day license spans leap days correctly rather than 90 fixed 24h blocks).
///
/// The UNIQUE constraint on license_key is the collision arbiter: a
/// duplicate insert fails, a fresh key is generated, and the write is
/// retried. Any other store failure propagates; the caller must not assume a
/// license exists after an error.
pub fn issue(
    conn: &Connection,
    order_id: i64,
    package_tier: &str,
    duration_days: i64,
) -> Result<IssuedLicense> {
    let issued_at = Utc::now();
    let expires_at = issued_at
        .checked_add_days(Days::new(duration_days as u64))
        .ok_or_else(|| AppError::Internal("License expiry out of range".into()))?
        .timestamp();

    for _ in 0..KEY_ATTEMPTS {
        let key = generate_license_key(issued_at);
        match queries::insert_license(
            conn,
            &key,
            order_id,
            package_tier,
            duration_days,
            issued_at.timestamp(),
            expires_at,
        ) {
            Ok(_) => {
                return Ok(IssuedLicense {
                    license_key: key,
                    expires_at,
                });
            }
            Err(AppError::Database(e)) if is_unique_violation(&e) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(AppError::Internal(
        "Exhausted license key generation attempts".into(),
    ))
}
