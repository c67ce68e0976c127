//! Outbound calls to the external transcoder.
//!
//! The transcoder accepts dispatched jobs at its intake endpoint and removes
//! jobs from the worker that claimed them. Everything behind that boundary
//! is opaque to the scheduler.

mod http;

pub use http::{HttpTranscoder, HttpTranscoderConfig};

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;
use crate::database::models::{Host, Preset};
use crate::domain::{Job, JobArguments};

/// Payload handed to the transcoder intake when a job is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRequest {
    pub job_id: i64,
    pub source_file: String,
    pub destination_file: String,
    /// Preset name.
    pub preset: String,
    pub priority: i64,
    pub arguments: JobArguments,
    pub callback_url: Option<String>,
}

impl DispatchRequest {
    pub fn new(job: &Job, preset: &Preset) -> Self {
        Self {
            job_id: job.id,
            source_file: job.source_file.clone(),
            destination_file: job.destination_file.clone(),
            preset: preset.name.clone(),
            priority: job.priority,
            arguments: job.arguments.clone(),
            callback_url: job.callback_url.clone(),
        }
    }
}

/// Identifies a job to remove from the worker that claimed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelRequest {
    pub job_id: i64,
    /// Base URL of the claiming host, if the host is known.
    pub host_url: Option<String>,
    pub remote_job_id: Option<String>,
}

impl CancelRequest {
    pub fn new(job: &Job, host: Option<&Host>) -> Self {
        Self {
            job_id: job.id,
            host_url: host.map(|h| h.url.clone()),
            remote_job_id: job.remote_job_id.clone(),
        }
    }

    /// Both the host and the worker's job id are needed to address the job.
    pub fn target(&self) -> Option<(&str, &str)> {
        Some((self.host_url.as_deref()?, self.remote_job_id.as_deref()?))
    }
}

/// External transcoder collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Hand a job to the transcoder intake.
    async fn schedule(&self, request: &DispatchRequest) -> Result<()>;

    /// Ask the claiming worker to drop a job.
    async fn remove_job(&self, request: &CancelRequest) -> Result<()>;
}
