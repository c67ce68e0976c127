//! Job entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{JobArguments, JobState};
use crate::database::models::JobDbModel;
use crate::database::time::{ms_to_datetime, now_ms};
use crate::{Error, Result};

/// Priority given to submissions that do not specify one.
pub const DEFAULT_PRIORITY: i64 = 0;

/// A persisted transcode job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub source_file: String,
    pub destination_file: String,
    pub preset_id: String,
    pub priority: i64,
    pub arguments: JobArguments,
    pub callback_url: Option<String>,
    pub state: JobState,
    pub host_id: Option<String>,
    pub remote_job_id: Option<String>,
    pub transcoding_started_at: Option<DateTime<Utc>>,
    pub progress: Option<f64>,
    pub duration: Option<f64>,
    pub filesize: Option<f64>,
    pub message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn is_unfinished(&self) -> bool {
        self.state.is_unfinished()
    }

    pub fn needs_update(&self) -> bool {
        self.state.needs_update()
    }

    /// Create a Job from a database row.
    pub fn from_db_model(model: &JobDbModel) -> Result<Self> {
        let state = JobState::parse(&model.state).ok_or_else(|| {
            Error::Database(format!("job {} has unknown state '{}'", model.id, model.state))
        })?;

        Ok(Self {
            id: model.id,
            source_file: model.source_file.clone(),
            destination_file: model.destination_file.clone(),
            preset_id: model.preset_id.clone(),
            priority: model.priority,
            arguments: JobArguments::from_json(&model.arguments)?,
            callback_url: model.callback_url.clone(),
            state,
            host_id: model.host_id.clone(),
            remote_job_id: model.remote_job_id.clone(),
            transcoding_started_at: model.transcoding_started_at.map(ms_to_datetime),
            progress: model.progress,
            duration: model.duration,
            filesize: model.filesize,
            message: model.message.clone(),
            completed_at: model.completed_at.map(ms_to_datetime),
            created_at: ms_to_datetime(model.created_at),
            updated_at: ms_to_datetime(model.updated_at),
        })
    }
}

/// A job that has not been stored yet.
///
/// Construction applies the initial state once; nothing re-applies it when
/// rows are loaded later.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub source_file: String,
    pub destination_file: String,
    pub preset_id: String,
    pub priority: i64,
    pub arguments: JobArguments,
    pub state: JobState,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl NewJob {
    pub fn new(
        source_file: impl Into<String>,
        destination_file: impl Into<String>,
        preset_id: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            destination_file: destination_file.into(),
            preset_id: preset_id.into(),
            priority: DEFAULT_PRIORITY,
            arguments: JobArguments::new(),
            state: JobState::default(),
            created_at: now_ms(),
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_arguments(mut self, arguments: JobArguments) -> Self {
        self.arguments = arguments;
        self
    }

    /// The entity this draft becomes once storage assigns `id`.
    pub fn into_job(self, id: i64) -> Job {
        let created_at = ms_to_datetime(self.created_at);
        Job {
            id,
            source_file: self.source_file,
            destination_file: self.destination_file,
            preset_id: self.preset_id,
            priority: self.priority,
            arguments: self.arguments,
            callback_url: None,
            state: self.state,
            host_id: None,
            remote_job_id: None,
            transcoding_started_at: None,
            progress: None,
            duration: None,
            filesize: None,
            message: None,
            completed_at: None,
            created_at,
            updated_at: created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_defaults() {
        let job = NewJob::new("in.mov", "out.mp4", "preset-1");
        assert_eq!(job.state, JobState::Scheduled);
        assert_eq!(job.priority, DEFAULT_PRIORITY);
        assert!(job.arguments.is_empty());
    }

    #[test]
    fn test_into_job_keeps_fields() {
        let job = NewJob::new("in.mov", "out.mp4", "preset-1")
            .with_priority(3)
            .with_arguments(JobArguments::parse("a=b"))
            .into_job(7);
        assert_eq!(job.id, 7);
        assert_eq!(job.priority, 3);
        assert_eq!(job.arguments.get("a"), Some("b"));
        assert!(job.is_unfinished());
        assert!(!job.needs_update());
    }

    #[test]
    fn test_from_db_model_rejects_unknown_state() {
        let mut model = JobDbModel::sample();
        model.state = "accepted".to_string();
        assert!(matches!(Job::from_db_model(&model), Err(Error::Database(_))));
    }

    #[test]
    fn test_from_db_model() {
        let model = JobDbModel::sample();
        let job = Job::from_db_model(&model).unwrap();
        assert_eq!(job.state, JobState::Processing);
        assert_eq!(job.arguments.get("threads"), Some("2"));
        assert_eq!(job.progress, Some(0.5));
        assert!(job.needs_update());
    }
}
