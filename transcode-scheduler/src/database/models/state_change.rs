//! State change audit model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One recorded transition of a job.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StateChange {
    pub id: i64,
    pub job_id: i64,
    pub state: String,
    pub message: Option<String>,
    pub created_at: i64,
}
