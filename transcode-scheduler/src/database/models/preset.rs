//! Preset database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::time::now_ms;

/// Named encoding profile.
///
/// Jobs reference a preset by name at submission; the transcoder receives
/// the name and interprets `parameters` itself.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Preset {
    /// Unique identifier (UUID).
    pub id: String,
    /// Unique name, e.g. "h264".
    pub name: String,
    /// JSON blob with encoder parameters.
    pub parameters: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Preset {
    pub fn new(name: impl Into<String>, parameters: serde_json::Value) -> Self {
        let now = now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            parameters: parameters.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if serde_json::from_str::<serde_json::Value>(&self.parameters).is_err() {
            return Err("Parameters must be valid JSON".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Preset::new("h264", serde_json::json!({"crf": 23})).validate().is_ok());
        assert!(Preset::new(" ", serde_json::json!({})).validate().is_err());

        let mut preset = Preset::new("h264", serde_json::json!({}));
        preset.parameters = "{".to_string();
        assert!(preset.validate().is_err());
    }
}
