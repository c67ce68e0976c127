//! Job routes.
//!
//! Submission, worker callbacks, listings and deletion.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::IntoResponse,
    routing::{MethodRouter, delete, get, post},
};
use serde_json::{Map, Value};

use crate::api::error::{ApiError, ApiResult};
use crate::api::models::{JobListParams, PageParams, PurgeResponse};
use crate::api::server::AppState;
use crate::database::models::{Paginated, StateChange};
use crate::domain::{Job, JobState, JobSubmission, StateParams};
use crate::services::JobDetails;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/purge", delete(purge_jobs))
        .route("/scheduled", list_in(JobState::Scheduled))
        .route("/transcoding", list_in(JobState::Transcoding))
        .route("/processing", list_in(JobState::Processing))
        .route("/on_hold", list_in(JobState::OnHold))
        .route("/success", list_in(JobState::Success))
        .route("/failed", list_in(JobState::Failed))
        .route("/{id}", get(show_job).put(update_job).delete(delete_job))
        .route("/{id}/retry", post(retry_job))
        .route("/{id}/state_changes", get(list_state_changes))
}

async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobListParams>,
) -> ApiResult<Json<Paginated<Job>>> {
    let jobs = state
        .jobs
        .recents(
            params.q.as_deref().unwrap_or_default(),
            params.sort.as_deref(),
            params.dir.as_deref(),
            params.page,
        )
        .await?;
    Ok(Json(jobs))
}

fn list_in(job_state: JobState) -> MethodRouter<AppState> {
    get(
        move |State(state): State<AppState>, Query(params): Query<PageParams>| async move {
            let jobs = state.jobs.list_by_state(job_state, params.page).await?;
            Ok::<_, ApiError>(Json(jobs))
        },
    )
}

/// `201 Created` with `Location` and `X-State-Changes-Location` headers.
async fn create_job(
    State(state): State<AppState>,
    Json(submission): Json<JobSubmission>,
) -> ApiResult<impl IntoResponse> {
    let callback = |job: &Job| state.callback_url(job.id);

    let job = state
        .jobs
        .create_from_submission(&submission, &callback)
        .await?;

    let mut headers = HeaderMap::new();
    let location = format!("/api/jobs/{}", job.id);
    let changes = format!("{location}/state_changes");
    for (name, value) in [
        (header::LOCATION, location),
        (HeaderName::from_static("x-state-changes-location"), changes),
    ] {
        let value = HeaderValue::from_str(&value)
            .map_err(|e| ApiError::internal(format!("Invalid header value: {e}")))?;
        headers.insert(name, value);
    }

    Ok((StatusCode::CREATED, headers, Json(job)))
}

async fn show_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<JobDetails>> {
    Ok(Json(state.jobs.show(id).await?))
}

/// Worker callback: `{"status": "<state>", ...params}`.
async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut body): Json<Map<String, Value>>,
) -> ApiResult<Json<Job>> {
    let status = match body.remove("status") {
        Some(Value::String(status)) => status,
        _ => return Err(ApiError::validation("status is required")),
    };
    let job_state = JobState::parse(&status)
        .ok_or_else(|| ApiError::validation(format!("Unknown status '{status}'")))?;

    let job = state
        .jobs
        .enter(id, job_state, &StateParams::from(body))
        .await?;
    Ok(Json(job))
}

async fn delete_job(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    state.jobs.destroy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn retry_job(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Job>> {
    Ok(Json(state.jobs.retry(id).await?))
}

async fn purge_jobs(State(state): State<AppState>) -> ApiResult<Json<PurgeResponse>> {
    let removed = state.jobs.purge().await?;
    Ok(Json(PurgeResponse { removed }))
}

async fn list_state_changes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<StateChange>>> {
    Ok(Json(state.jobs.state_changes(id).await?))
}
