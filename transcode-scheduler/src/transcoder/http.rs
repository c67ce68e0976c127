//! HTTP transcoder client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CancelRequest, DispatchRequest, Transcoder};
use crate::{Error, Result};

/// Settings for [`HttpTranscoder`].
#[derive(Debug, Clone)]
pub struct HttpTranscoderConfig {
    /// Intake base URL; jobs are POSTed to `{base_url}/jobs`.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for HttpTranscoderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Transcoder reached over its REST interface.
pub struct HttpTranscoder {
    config: HttpTranscoderConfig,
    client: Client,
}

impl HttpTranscoder {
    pub fn new(config: HttpTranscoderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build transcoder client: {e}")))?;

        Ok(Self { config, client })
    }

    fn intake_url(&self) -> String {
        format!("{}/jobs", self.config.base_url.trim_end_matches('/'))
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("{status} - {body}")
}

#[async_trait]
impl Transcoder for HttpTranscoder {
    async fn schedule(&self, request: &DispatchRequest) -> Result<()> {
        let response = self
            .client
            .post(self.intake_url())
            .json(request)
            .send()
            .await
            .map_err(|e| Error::dispatch(format!("Transcoder intake unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::dispatch(format!(
                "Transcoder rejected job {}: {}",
                request.job_id,
                error_body(response).await
            )));
        }

        debug!(job_id = request.job_id, "Job dispatched to transcoder");
        Ok(())
    }

    async fn remove_job(&self, request: &CancelRequest) -> Result<()> {
        let Some((host_url, remote_job_id)) = request.target() else {
            debug!(job_id = request.job_id, "Job was never claimed, nothing to cancel");
            return Ok(());
        };

        let url = format!("{}/jobs/{}", host_url.trim_end_matches('/'), remote_job_id);
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| Error::Transcoder(format!("Cancel request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Transcoder(format!(
                "Cancel of job {} failed: {}",
                request.job_id,
                error_body(response).await
            )));
        }

        debug!(job_id = request.job_id, remote_job_id, "Job removed from worker");
        Ok(())
    }
}
