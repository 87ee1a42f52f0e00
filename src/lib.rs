//! License server backed by the PayOS payment gateway.
//!
//! Sells time-boxed software licenses: an order is created for a package
//! tier, paid through a hosted checkout, confirmed by an asynchronous
//! webhook (idempotent under redelivery), and the resulting license is
//! permanently bound to the first machine that activates it.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod licensing;
pub mod lifecycle;
pub mod models;
pub mod payments;
