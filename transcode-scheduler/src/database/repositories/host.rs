//! Host repository.

use async_trait::async_trait;

use crate::Result;
use crate::database::DbPool;
use crate::database::models::Host;

/// Repository for transcoder hosts.
#[async_trait]
pub trait HostRepository: Send + Sync {
    async fn get_host(&self, id: &str) -> Result<Option<Host>>;
    async fn list_hosts(&self) -> Result<Vec<Host>>;
    async fn create_host(&self, host: &Host) -> Result<()>;
}

/// SQLx implementation of HostRepository.
pub struct SqlxHostRepository {
    pool: DbPool,
}

impl SqlxHostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostRepository for SqlxHostRepository {
    async fn get_host(&self, id: &str) -> Result<Option<Host>> {
        let host = sqlx::query_as::<_, Host>("SELECT * FROM hosts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(host)
    }

    async fn list_hosts(&self) -> Result<Vec<Host>> {
        let hosts = sqlx::query_as::<_, Host>("SELECT * FROM hosts ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(hosts)
    }

    async fn create_host(&self, host: &Host) -> Result<()> {
        sqlx::query(
            "INSERT INTO hosts (id, name, url, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&host.id)
        .bind(&host.name)
        .bind(&host.url)
        .bind(host.created_at)
        .bind(host.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
