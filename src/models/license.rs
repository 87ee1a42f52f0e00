use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LicenseStatus {
    Active,
    Revoked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: i64,
    pub license_key: String,
    pub order_id: i64,
    pub package_tier: String,
    pub duration_days: i64,
    /// Set at issuance; the validity window starts here.
    pub activated_at: Option<i64>,
    pub expires_at: i64,
    pub status: LicenseStatus,
    /// First machine to activate; NULL until then. The compare-and-set on
    /// this column is the binding invariant (the activations table is audit).
    pub bound_machine_id: Option<String>,
    pub created_at: i64,
}

impl License {
    pub fn public(&self) -> LicensePublic {
        LicensePublic {
            key: self.license_key.clone(),
            package_tier: self.package_tier.clone(),
            duration_days: self.duration_days,
            expires_at: self.expires_at,
        }
    }
}

/// The fields a client is allowed to see after a successful activation.
#[derive(Debug, Clone, Serialize)]
pub struct LicensePublic {
    pub key: String,
    pub package_tier: String,
    pub duration_days: i64,
    pub expires_at: i64,
}

/// One (license key, machine) activation record. Append-only audit trail;
/// UNIQUE(license_key, machine_id) makes re-activation a no-op.
#[derive(Debug, Clone, Serialize)]
pub struct Activation {
    pub id: i64,
    pub license_key: String,
    pub machine_id: String,
    pub activated_at: i64,
}
