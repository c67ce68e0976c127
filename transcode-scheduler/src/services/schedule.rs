//! Scheduling trigger.
//!
//! Runs when a job enters `scheduled`: the job is packaged into a
//! [`DispatchRequest`] and handed to the transcoder intake. Both dispatch and
//! cancellation are bounded by a timeout so a slow transcoder cannot stall
//! the caller.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::database::models::{Host, Preset};
use crate::domain::Job;
use crate::transcoder::{CancelRequest, DispatchRequest, Transcoder};
use crate::{Error, Result};

/// Default bound on transcoder calls.
pub const DEFAULT_TRANSCODER_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ScheduleJob {
    transcoder: Arc<dyn Transcoder>,
    timeout: Duration,
}

impl ScheduleJob {
    pub fn new(transcoder: Arc<dyn Transcoder>, timeout: Duration) -> Self {
        Self {
            transcoder,
            timeout,
        }
    }

    /// Dispatch `job`; rejection, transport errors and timeouts all surface
    /// as [`Error::Dispatch`].
    pub async fn dispatch(&self, job: &Job, preset: &Preset) -> Result<()> {
        let request = DispatchRequest::new(job, preset);

        match tokio::time::timeout(self.timeout, self.transcoder.schedule(&request)).await {
            Ok(Ok(())) => {
                info!(job_id = job.id, preset = %preset.name, "Job dispatched");
                Ok(())
            }
            Ok(Err(Error::Dispatch(msg))) => Err(Error::Dispatch(msg)),
            Ok(Err(e)) => Err(Error::dispatch(e.to_string())),
            Err(_) => Err(Error::dispatch(format!(
                "transcoder did not answer within {:?}",
                self.timeout
            ))),
        }
    }

    /// Ask the transcoder to drop `job`. Never fails.
    pub async fn cancel(&self, job: &Job, host: Option<&Host>) {
        let request = CancelRequest::new(job, host);

        match tokio::time::timeout(self.timeout, self.transcoder.remove_job(&request)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(job_id = job.id, error = %e, "Failed to cancel job on transcoder"),
            Err(_) => warn!(job_id = job.id, "Cancel request to transcoder timed out"),
        }
    }
}
