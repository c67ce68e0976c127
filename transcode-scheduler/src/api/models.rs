//! API request and response models.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/jobs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobListParams {
    /// Search string, e.g. `state:failed source:foo`.
    #[serde(default)]
    pub q: Option<String>,
    pub sort: Option<String>,
    pub dir: Option<String>,
    #[serde(default = "first_page")]
    pub page: u32,
}

/// Query string of the per-state listings.
#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "first_page")]
    pub page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePresetRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterHostRequest {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    pub removed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLogFilterRequest {
    pub filter: String,
}

#[derive(Debug, Serialize)]
pub struct LoggingConfigResponse {
    pub filter: String,
    pub available_modules: Vec<ModuleInfo>,
}

#[derive(Debug, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub description: String,
}
