//! Activation checks and single-machine binding.

use chrono::Utc;
use rusqlite::Connection;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::License;

/// Why an activation was refused. Ordered: an expired license reports
/// Expired even if the requesting machine would also have failed the
/// binding check, and a revoked or unknown key reports NotFound before
/// anything else is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NotFound,
    Expired,
    MachineMismatch,
}

impl Rejection {
    pub fn reason(self) -> &'static str {
        match self {
            Rejection::NotFound => "License not found or inactive",
            Rejection::Expired => "License expired",
            Rejection::MachineMismatch => "License already activated on another machine",
        }
    }
}

#[derive(Debug)]
pub enum ActivationOutcome {
    Valid(License),
    Rejected(Rejection),
}

/// Activate a license on a machine.
///
/// Check order is a contract: existence/status, then expiry, then machine
/// binding. Expiry before binding means an expired license never consumes
/// its activation slot. Binding is a compare-and-set on the license row
/// (from NULL or the same machine id), so two concurrent first activations
/// from different machines serialize on one UPDATE and exactly one wins;
/// the loser mutates nothing. Re-activation on the bound machine always
/// succeeds and the audit insert is a no-op.
pub fn activate(conn: &Connection, license_key: &str, machine_id: &str) -> Result<ActivationOutcome> {
    let Some(license) = queries::get_active_license_by_key(conn, license_key)? else {
        return Ok(ActivationOutcome::Rejected(Rejection::NotFound));
    };

    if Utc::now().timestamp() > license.expires_at {
        return Ok(ActivationOutcome::Rejected(Rejection::Expired));
    }

    if !queries::bind_machine(conn, license_key, machine_id)? {
        return Ok(ActivationOutcome::Rejected(Rejection::MachineMismatch));
    }
    queries::record_activation(conn, license_key, machine_id)?;

    // Re-read so the returned row reflects the binding just taken.
    let license = queries::get_active_license_by_key(conn, license_key)?
        .ok_or_else(|| AppError::Internal("License disappeared during activation".into()))?;

    Ok(ActivationOutcome::Valid(license))
}
