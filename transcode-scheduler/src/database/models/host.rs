//! Host database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::time::now_ms;

/// A transcoder worker.
///
/// `url` is the worker's base address; cancellations go to
/// `{url}/jobs/{remote_job_id}`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Host {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            url: url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(format!("Invalid host url '{}'", self.url));
        }
        Ok(())
    }
}
