//! REST API server module.
//!
//! Thin HTTP boundary over the job service: submission, worker callbacks,
//! listings, presets, hosts and runtime log control.

pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{ApiServer, ApiServerConfig, AppState};
