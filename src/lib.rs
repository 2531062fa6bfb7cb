//! Inbound lead tracking.
//!
//! Leads arrive through a public contact form, an admin works them through
//! `New -> Contacted -> Converted`, and the dashboard reads [`DerivedMetrics`]
//! computed by the pure [`analytics`] engine over a snapshot of the store.
//!
//! [`DerivedMetrics`]: analytics::DerivedMetrics

pub mod analytics;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod state;

pub use error::{AppError, Result};
