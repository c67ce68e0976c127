//! Preset and host management.

use std::sync::Arc;

use tracing::info;

use crate::database::models::{Host, Preset};
use crate::database::repositories::{HostRepository, PresetRepository};
use crate::{Error, Result};

/// Reference data jobs point at: encoding presets and transcoder hosts.
pub struct CatalogService {
    presets: Arc<dyn PresetRepository>,
    hosts: Arc<dyn HostRepository>,
}

impl CatalogService {
    pub fn new(presets: Arc<dyn PresetRepository>, hosts: Arc<dyn HostRepository>) -> Self {
        Self { presets, hosts }
    }

    pub async fn create_preset(
        &self,
        name: &str,
        parameters: serde_json::Value,
    ) -> Result<Preset> {
        let preset = Preset::new(name.trim(), parameters);
        preset.validate().map_err(Error::Validation)?;
        self.presets.create_preset(&preset).await?;
        info!(preset = %preset.name, "Preset created");
        Ok(preset)
    }

    pub async fn list_presets(&self) -> Result<Vec<Preset>> {
        self.presets.list_presets().await
    }

    pub async fn get_preset(&self, id: &str) -> Result<Preset> {
        self.presets
            .get_preset(id)
            .await?
            .ok_or_else(|| Error::not_found("Preset", id))
    }

    pub async fn delete_preset(&self, id: &str) -> Result<()> {
        self.presets.delete_preset(id).await?;
        info!(preset_id = id, "Preset deleted");
        Ok(())
    }

    pub async fn register_host(&self, name: &str, url: &str) -> Result<Host> {
        let host = Host::new(name.trim(), url.trim());
        host.validate().map_err(Error::Validation)?;
        self.hosts.create_host(&host).await?;
        info!(host = %host.name, url = %host.url, "Host registered");
        Ok(host)
    }

    pub async fn list_hosts(&self) -> Result<Vec<Host>> {
        self.hosts.list_hosts().await
    }

    pub async fn get_host(&self, id: &str) -> Result<Host> {
        self.hosts
            .get_host(id)
            .await?
            .ok_or_else(|| Error::not_found("Host", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::{SqlxHostRepository, SqlxPresetRepository};
    use crate::database::{init_pool_with_size, run_migrations};

    async fn service() -> CatalogService {
        let pool = init_pool_with_size("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        CatalogService::new(
            Arc::new(SqlxPresetRepository::new(pool.clone())),
            Arc::new(SqlxHostRepository::new(pool)),
        )
    }

    #[tokio::test]
    async fn test_preset_lifecycle() {
        let service = service().await;
        let preset = service
            .create_preset(" h264 ", serde_json::json!({"crf": 23}))
            .await
            .unwrap();
        assert_eq!(preset.name, "h264");
        assert_eq!(service.get_preset(&preset.id).await.unwrap().name, "h264");

        service.delete_preset(&preset.id).await.unwrap();
        assert!(service.list_presets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_preset_name_rejected() {
        let service = service().await;
        let result = service.create_preset("", serde_json::json!({})).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_host() {
        let service = service().await;
        assert!(matches!(
            service.register_host("w1", "ftp://w1").await,
            Err(Error::Validation(_))
        ));

        let host = service.register_host("w1", "http://w1:8080").await.unwrap();
        assert_eq!(service.get_host(&host.id).await.unwrap().url, "http://w1:8080");
        assert!(matches!(
            service.get_host("missing").await,
            Err(Error::NotFound { .. })
        ));
    }
}
