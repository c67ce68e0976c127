//! Service container for dependency injection.
//!
//! Wires repositories, the transcoder client and services over one pool.

use std::sync::Arc;

use tracing::info;

use super::{CatalogService, JobService, ListingConfig, ScheduleJob};
use crate::Result;
use crate::config::AppConfig;
use crate::database::DbPool;
use crate::database::repositories::{SqlxHostRepository, SqlxJobRepository, SqlxPresetRepository};
use crate::transcoder::{HttpTranscoder, HttpTranscoderConfig, Transcoder};

/// Application services sharing one database pool.
pub struct ServiceContainer {
    pub pool: DbPool,
    pub jobs: Arc<JobService>,
    pub catalog: Arc<CatalogService>,
}

impl ServiceContainer {
    /// Build services that reach the transcoder over HTTP.
    pub fn new(pool: DbPool, config: &AppConfig) -> Result<Self> {
        let transcoder = HttpTranscoder::new(HttpTranscoderConfig {
            base_url: config.transcoder_url.clone(),
            timeout: config.transcoder_timeout,
        })?;
        Ok(Self::with_transcoder(pool, config, Arc::new(transcoder)))
    }

    /// Build services around an arbitrary transcoder.
    pub fn with_transcoder(
        pool: DbPool,
        config: &AppConfig,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        info!("Initializing service container");

        let job_repo = Arc::new(SqlxJobRepository::new(pool.clone()));
        let preset_repo = Arc::new(SqlxPresetRepository::new(pool.clone()));
        let host_repo = Arc::new(SqlxHostRepository::new(pool.clone()));

        let scheduler = ScheduleJob::new(transcoder, config.transcoder_timeout);
        let jobs = JobService::new(job_repo, preset_repo.clone(), host_repo.clone(), scheduler)
            .with_listing(ListingConfig {
                per_page: config.jobs_per_page,
                timezone: config.search_timezone,
            });
        let catalog = CatalogService::new(preset_repo, host_repo);

        info!("Service container initialized");

        Self {
            pool,
            jobs: Arc::new(jobs),
            catalog: Arc::new(catalog),
        }
    }
}
