use serde::Serialize;

/// A purchasable license tier. The table is fixed at compile time; amounts
/// are VND (no minor units).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Package {
    pub id: &'static str,
    pub name: &'static str,
    pub duration_days: i64,
    pub price: i64,
}

pub const PACKAGES: &[Package] = &[
    Package { id: "trial", name: "7-day trial", duration_days: 7, price: 0 },
    Package { id: "1month", name: "1 month", duration_days: 30, price: 299_000 },
    Package { id: "3months", name: "3 months", duration_days: 90, price: 799_000 },
    Package { id: "6months", name: "6 months", duration_days: 180, price: 1_399_000 },
    Package { id: "12months", name: "12 months", duration_days: 365, price: 2_499_000 },
];

pub fn find_package(id: &str) -> Option<&'static Package> {
    PACKAGES.iter().find(|p| p.id == id)
}
