//! Pantry coupon ledger: issued/returned entries, GST billing summaries and
//! per-person usage reconciliation.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use error::PantryError;
pub use startup::{AppState, Application};
