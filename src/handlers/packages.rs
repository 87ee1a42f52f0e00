use serde::Serialize;

use crate::extractors::Json;
use crate::models::{Package, PACKAGES};

#[derive(Serialize)]
pub struct PackagesResponse {
    pub tiers: &'static [Package],
}

pub async fn list_packages() -> Json<PackagesResponse> {
    Json(PackagesResponse { tiers: PACKAGES })
}
