//! Preset repository.

use async_trait::async_trait;

use crate::database::DbPool;
use crate::database::models::Preset;
use crate::{Error, Result};

/// Repository for encoding presets.
#[async_trait]
pub trait PresetRepository: Send + Sync {
    async fn get_preset(&self, id: &str) -> Result<Option<Preset>>;
    async fn get_preset_by_name(&self, name: &str) -> Result<Option<Preset>>;
    async fn list_presets(&self) -> Result<Vec<Preset>>;
    async fn create_preset(&self, preset: &Preset) -> Result<()>;
    /// Fails with a validation error while jobs still reference the preset.
    async fn delete_preset(&self, id: &str) -> Result<()>;
}

/// SQLx implementation of PresetRepository.
pub struct SqlxPresetRepository {
    pool: DbPool,
}

impl SqlxPresetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresetRepository for SqlxPresetRepository {
    async fn get_preset(&self, id: &str) -> Result<Option<Preset>> {
        let preset = sqlx::query_as::<_, Preset>("SELECT * FROM presets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(preset)
    }

    async fn get_preset_by_name(&self, name: &str) -> Result<Option<Preset>> {
        let preset = sqlx::query_as::<_, Preset>("SELECT * FROM presets WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(preset)
    }

    async fn list_presets(&self) -> Result<Vec<Preset>> {
        let presets = sqlx::query_as::<_, Preset>("SELECT * FROM presets ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(presets)
    }

    async fn create_preset(&self, preset: &Preset) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO presets (id, name, parameters, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&preset.id)
        .bind(&preset.name)
        .bind(&preset.parameters)
        .bind(preset.created_at)
        .bind(preset.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::validation(
                format!("Preset '{}' already exists", preset.name),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_preset(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM presets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(r) if r.rows_affected() == 0 => Err(Error::not_found("Preset", id)),
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => Err(
                Error::validation("Preset is still referenced by jobs"),
            ),
            Err(e) => Err(e.into()),
        }
    }
}
