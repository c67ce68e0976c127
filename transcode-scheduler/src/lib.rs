//! transcode-scheduler library crate.
//!
//! Tracks transcode jobs through their lifecycle, dispatches them to an
//! external transcoder and answers structured search queries over them.

pub mod api;
pub mod config;
pub mod database;
pub mod domain;
pub mod error;
pub mod logging;
pub mod services;
pub mod transcoder;

pub use error::{Error, Result};
