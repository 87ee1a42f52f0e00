use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::licensing::{self, ActivationOutcome};
use crate::models::{Activation, License, LicensePublic};

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub license_key: String,
    pub machine_id: String,
}

#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    pub valid: bool,
    pub license: LicensePublic,
}

/// POST /licenses/activate - bind a license to a machine (or re-activate on
/// the machine it is already bound to). Rejections are 400s carrying the
/// reason string; a rejected call mutates nothing.
pub async fn activate_license(
    State(state): State<AppState>,
    Json(request): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>> {
    if request.license_key.trim().is_empty() || request.machine_id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "license_key and machine_id are required".into(),
        ));
    }

    let conn = state.db.get()?;
    match licensing::activate(&conn, &request.license_key, &request.machine_id)? {
        ActivationOutcome::Valid(license) => Ok(Json(ActivateResponse {
            valid: true,
            license: license.public(),
        })),
        ActivationOutcome::Rejected(rejection) => {
            tracing::debug!(
                "activation rejected for {}: {}",
                request.license_key,
                rejection.reason()
            );
            Err(AppError::BadRequest(rejection.reason().into()))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LicenseInfoResponse {
    #[serde(flatten)]
    pub license: License,
    pub activations: Vec<Activation>,
}

/// GET /licenses/{key} - full license record with its activation history.
pub async fn get_license(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LicenseInfoResponse>> {
    let conn = state.db.get()?;

    let license = queries::get_license_by_key(&conn, &key)?
        .ok_or_else(|| AppError::NotFound("License not found".into()))?;
    let activations = queries::list_activations(&conn, &key)?;

    Ok(Json(LicenseInfoResponse {
        license,
        activations,
    }))
}
