//! Job database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `jobs` table.
///
/// Timestamps are Unix epoch milliseconds; `arguments` is a JSON object.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct JobDbModel {
    pub id: i64,
    pub source_file: String,
    pub destination_file: String,
    pub preset_id: String,
    pub priority: i64,
    pub arguments: String,
    pub callback_url: Option<String>,
    /// scheduled, transcoding, processing, onhold, failed, success
    pub state: String,
    pub host_id: Option<String>,
    pub remote_job_id: Option<String>,
    pub transcoding_started_at: Option<i64>,
    pub progress: Option<f64>,
    pub duration: Option<f64>,
    pub filesize: Option<f64>,
    pub message: Option<String>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
impl JobDbModel {
    pub(crate) fn sample() -> Self {
        Self {
            id: 1,
            source_file: "in.mov".to_string(),
            destination_file: "out.mp4".to_string(),
            preset_id: "preset-1".to_string(),
            priority: 0,
            arguments: r#"{"threads":"2"}"#.to_string(),
            callback_url: None,
            state: "processing".to_string(),
            host_id: Some("host-1".to_string()),
            remote_job_id: Some("r-1".to_string()),
            transcoding_started_at: Some(1_700_000_000_000),
            progress: Some(0.5),
            duration: Some(60.0),
            filesize: Some(1024.0),
            message: None,
            completed_at: None,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }
}
