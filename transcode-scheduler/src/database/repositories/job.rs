//! Job repository.

use async_trait::async_trait;

use crate::database::DbPool;
use crate::database::models::{JobDbModel, Page, Paginated, StateChange};
use crate::database::search::{JobSearch, SortOrder};
use crate::database::time::datetime_to_ms;
use crate::domain::{FieldValue, Job, NewJob, Transition};
use crate::{Error, Result};

/// Builds a job's callback URL once its id is known.
pub type CallbackResolver<'a> = dyn Fn(&Job) -> String + Send + Sync + 'a;

/// Job repository trait.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn get_job(&self, id: i64) -> Result<JobDbModel>;

    /// Insert a job, resolve its callback URL and record the initial state,
    /// all in one transaction.
    async fn create_job(
        &self,
        job: &NewJob,
        callback: &CallbackResolver<'_>,
    ) -> Result<JobDbModel>;

    /// Persist a state transition and its audit row.
    async fn apply_transition(&self, id: i64, transition: &Transition) -> Result<JobDbModel>;

    /// Returns false when no such job existed.
    async fn delete_job(&self, id: i64) -> Result<bool>;

    async fn list_jobs_by_state(&self, state: &str) -> Result<Vec<JobDbModel>>;

    async fn search_jobs(
        &self,
        search: &JobSearch,
        order: &SortOrder,
        page: Page,
    ) -> Result<Paginated<JobDbModel>>;

    async fn list_state_changes(&self, job_id: i64) -> Result<Vec<StateChange>>;
}

/// SQLx implementation of JobRepository.
pub struct SqlxJobRepository {
    pool: DbPool,
}

impl SqlxJobRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRepository for SqlxJobRepository {
    async fn get_job(&self, id: i64) -> Result<JobDbModel> {
        sqlx::query_as::<_, JobDbModel>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::not_found("Job", id.to_string()))
    }

    async fn create_job(
        &self,
        job: &NewJob,
        callback: &CallbackResolver<'_>,
    ) -> Result<JobDbModel> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO jobs (
                source_file, destination_file, preset_id, priority, arguments,
                state, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.source_file)
        .bind(&job.destination_file)
        .bind(&job.preset_id)
        .bind(job.priority)
        .bind(job.arguments.to_json()?)
        .bind(job.state.as_str())
        .bind(job.created_at)
        .bind(job.created_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let callback_url = callback(&job.clone().into_job(id));
        sqlx::query("UPDATE jobs SET callback_url = ? WHERE id = ?")
            .bind(&callback_url)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO state_changes (job_id, state, message, created_at) VALUES (?, ?, NULL, ?)")
            .bind(id)
            .bind(job.state.as_str())
            .bind(job.created_at)
            .execute(&mut *tx)
            .await?;

        let model = sqlx::query_as::<_, JobDbModel>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(model)
    }

    async fn apply_transition(&self, id: i64, transition: &Transition) -> Result<JobDbModel> {
        let at = datetime_to_ms(transition.at);
        let columns = transition.entry.changes();

        let mut sql = String::from("UPDATE jobs SET state = ?, updated_at = ?");
        for (name, _) in &columns {
            sql.push_str(&format!(", {name} = ?"));
        }
        sql.push_str(" WHERE id = ?");

        let mut query = sqlx::query(&sql).bind(transition.state().as_str()).bind(at);
        for (_, value) in columns {
            query = match value {
                FieldValue::Text(v) => query.bind(v),
                FieldValue::Real(v) => query.bind(v),
                FieldValue::Timestamp(t) => query.bind(datetime_to_ms(t)),
            };
        }

        let mut tx = self.pool.begin().await?;

        let result = query.bind(id).execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(Error::not_found("Job", id.to_string()));
        }

        sqlx::query("INSERT INTO state_changes (job_id, state, message, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(transition.state().as_str())
            .bind(&transition.note)
            .bind(at)
            .execute(&mut *tx)
            .await?;

        let model = sqlx::query_as::<_, JobDbModel>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(model)
    }

    async fn delete_job(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_jobs_by_state(&self, state: &str) -> Result<Vec<JobDbModel>> {
        let jobs = sqlx::query_as::<_, JobDbModel>(
            "SELECT * FROM jobs WHERE state = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(state)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }

    async fn search_jobs(
        &self,
        search: &JobSearch,
        order: &SortOrder,
        page: Page,
    ) -> Result<Paginated<JobDbModel>> {
        let from = search.from_sql();
        let where_clause = search.where_sql();

        let count_sql = format!("SELECT COUNT(*) {from} {where_clause}");
        let data_sql = format!(
            "SELECT jobs.* {from} {where_clause} ORDER BY {} LIMIT ? OFFSET ?",
            order.to_sql()
        );
        tracing::trace!(sql = %data_sql, "Searching jobs");

        let count_query = bind_all!(sqlx::query_scalar::<_, i64>(&count_sql), search.binds());
        let total = count_query.fetch_one(&self.pool).await? as u64;

        let data_query = bind_all!(sqlx::query_as::<_, JobDbModel>(&data_sql), search.binds());
        let jobs = data_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(jobs, total, page))
    }

    async fn list_state_changes(&self, job_id: i64) -> Result<Vec<StateChange>> {
        let changes = sqlx::query_as::<_, StateChange>(
            "SELECT * FROM state_changes WHERE job_id = ? ORDER BY created_at, id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(changes)
    }
}
