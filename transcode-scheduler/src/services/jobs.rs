//! Job lifecycle service.
//!
//! Owns creation, state transitions, deletion and listing of jobs. Every
//! operation is a short independent unit of work; concurrent transitions on
//! one job are serialized by SQLite's write lock with the last write winning.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ScheduleJob;
use crate::database::models::{Host, Page, Paginated, Preset, StateChange};
use crate::database::repositories::{
    CallbackResolver, HostRepository, JobRepository, PresetRepository,
};
use crate::database::{JobSearch, SortOrder};
use crate::domain::{
    DEFAULT_PRIORITY, Job, JobArguments, JobState, JobSubmission, NewJob, StateParams, Transition,
};
use crate::{Error, Result};

/// Default listing page size.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// A job with its associations resolved.
#[derive(Debug, Clone, Serialize)]
pub struct JobDetails {
    #[serde(flatten)]
    pub job: Job,
    pub preset: Option<Preset>,
    pub host: Option<Host>,
    pub state_changes: Vec<StateChange>,
}

/// Listing settings.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    pub per_page: u32,
    /// Zone whose midnights bound date-shortcut windows.
    pub timezone: Tz,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            timezone: Tz::UTC,
        }
    }
}

pub struct JobService {
    jobs: Arc<dyn JobRepository>,
    presets: Arc<dyn PresetRepository>,
    hosts: Arc<dyn HostRepository>,
    scheduler: ScheduleJob,
    listing: ListingConfig,
}

impl JobService {
    pub fn new(
        jobs: Arc<dyn JobRepository>,
        presets: Arc<dyn PresetRepository>,
        hosts: Arc<dyn HostRepository>,
        scheduler: ScheduleJob,
    ) -> Self {
        Self {
            jobs,
            presets,
            hosts,
            scheduler,
            listing: ListingConfig::default(),
        }
    }

    pub fn with_listing(mut self, listing: ListingConfig) -> Self {
        self.listing = listing;
        self
    }

    pub fn per_page(&self) -> u32 {
        self.listing.per_page
    }

    /// Validate, persist and schedule a submitted job.
    ///
    /// Nothing is stored when validation fails. When the dispatch fails the
    /// stored row is removed again, so an error always means "not created".
    pub async fn create_from_submission(
        &self,
        submission: &JobSubmission,
        callback: &CallbackResolver<'_>,
    ) -> Result<Job> {
        let preset = match submission.preset_name() {
            Some(name) => self.presets.get_preset_by_name(name).await?,
            None => None,
        };
        submission.validate(preset.is_some())?;
        let preset = preset.ok_or_else(|| Error::validation("preset can't be blank"))?;

        let new_job = NewJob::new(
            submission.input.clone().unwrap_or_default(),
            submission.output.clone().unwrap_or_default(),
            &preset.id,
        )
        .with_priority(submission.priority.unwrap_or(DEFAULT_PRIORITY))
        .with_arguments(JobArguments::parse(
            submission.arguments.as_deref().unwrap_or_default(),
        ));

        let model = self.jobs.create_job(&new_job, callback).await?;
        let job = Job::from_db_model(&model)?;
        info!(job_id = job.id, source = %job.source_file, "Job created");

        if let Err(e) = self.scheduler.dispatch(&job, &preset).await {
            warn!(job_id = job.id, error = %e, "Dispatch failed, removing job");
            if let Err(delete_err) = self.jobs.delete_job(job.id).await {
                warn!(job_id = job.id, error = %delete_err, "Failed to remove undispatched job");
            }
            return Err(e);
        }

        Ok(job)
    }

    /// Move a job into `state`, applying that state's entry effects.
    ///
    /// Any state may follow any other. Entering `scheduled` dispatches the
    /// job after the state is stored; a dispatch failure is returned with
    /// the job left in `scheduled`.
    pub async fn enter(&self, id: i64, state: JobState, params: &StateParams) -> Result<Job> {
        let transition = Transition::new(state, params);
        let model = self.jobs.apply_transition(id, &transition).await?;
        let job = Job::from_db_model(&model)?;
        debug!(job_id = id, state = %state, "Job entered state");

        if transition.entry.dispatches() {
            let preset = self.preset_of(&job).await?;
            self.scheduler.dispatch(&job, &preset).await?;
        }

        Ok(job)
    }

    /// Re-enter `scheduled`.
    pub async fn retry(&self, id: i64) -> Result<Job> {
        self.enter(id, JobState::Scheduled, &StateParams::new()).await
    }

    /// Delete a job after asking the transcoder to drop it.
    ///
    /// The cancel notification is best effort and never fails the deletion.
    pub async fn destroy(&self, id: i64) -> Result<()> {
        let job = Job::from_db_model(&self.jobs.get_job(id).await?)?;
        self.remove(&job).await
    }

    /// Delete every failed job. Returns how many were removed.
    ///
    /// A job that cannot be removed is logged and skipped.
    pub async fn purge(&self) -> Result<u64> {
        let failed = self
            .jobs
            .list_jobs_by_state(JobState::Failed.as_str())
            .await?;

        let mut removed = 0;
        for model in &failed {
            let removal = match Job::from_db_model(model) {
                Ok(job) => self.remove(&job).await,
                Err(e) => Err(e),
            };
            match removal {
                Ok(()) => removed += 1,
                Err(e) => warn!(job_id = model.id, error = %e, "Failed to purge job"),
            }
        }

        info!(removed, "Purged failed jobs");
        Ok(removed)
    }

    async fn remove(&self, job: &Job) -> Result<()> {
        let host = self.host_of(job).await;
        self.scheduler.cancel(job, host.as_ref()).await;
        self.jobs.delete_job(job.id).await?;
        info!(job_id = job.id, "Job deleted");
        Ok(())
    }

    /// Filtered, ordered page of jobs.
    pub async fn recents(
        &self,
        query: &str,
        sort: Option<&str>,
        dir: Option<&str>,
        page: u32,
    ) -> Result<Paginated<Job>> {
        let now = Utc::now().with_timezone(&self.listing.timezone);
        let search = JobSearch::parse(query, &now);
        let order = SortOrder::from_params(sort, dir);
        let page = Page::new(page, self.listing.per_page);

        self.jobs
            .search_jobs(&search, &order, page)
            .await?
            .try_map(|model| Job::from_db_model(&model))
    }

    /// Newest-first page of jobs in `state`.
    pub async fn list_by_state(&self, state: JobState, page: u32) -> Result<Paginated<Job>> {
        let search = JobSearch::by_state(state.as_str());
        let page = Page::new(page, self.listing.per_page);

        self.jobs
            .search_jobs(&search, &SortOrder::Recent, page)
            .await?
            .try_map(|model| Job::from_db_model(&model))
    }

    pub async fn get(&self, id: i64) -> Result<Job> {
        Job::from_db_model(&self.jobs.get_job(id).await?)
    }

    /// Job with preset, host and audit trail.
    pub async fn show(&self, id: i64) -> Result<JobDetails> {
        let job = self.get(id).await?;
        let preset = self.presets.get_preset(&job.preset_id).await?;
        let host = self.host_of(&job).await;
        let state_changes = self.jobs.list_state_changes(id).await?;

        Ok(JobDetails {
            job,
            preset,
            host,
            state_changes,
        })
    }

    pub async fn state_changes(&self, id: i64) -> Result<Vec<StateChange>> {
        self.jobs.get_job(id).await?;
        self.jobs.list_state_changes(id).await
    }

    async fn preset_of(&self, job: &Job) -> Result<Preset> {
        self.presets
            .get_preset(&job.preset_id)
            .await?
            .ok_or_else(|| Error::not_found("Preset", &job.preset_id))
    }

    /// The claiming host, if known. Lookup errors are logged and ignored.
    async fn host_of(&self, job: &Job) -> Option<Host> {
        let host_id = job.host_id.as_deref()?;
        match self.hosts.get_host(host_id).await {
            Ok(host) => host,
            Err(e) => {
                warn!(job_id = job.id, host_id, error = %e, "Failed to load host");
                None
            }
        }
    }
}
