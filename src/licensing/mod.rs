//! The licensing core: key issuance and machine-bound activation.

pub mod issuer;
pub mod validator;

pub use issuer::{issue, IssuedLicense};
pub use validator::{activate, ActivationOutcome, Rejection};
