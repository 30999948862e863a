// API request/response models (DTOs)

use serde::{Deserialize, Serialize};

/// The seven mutable Game fields accepted by create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GamePayload {
    #[serde(default)]
    pub publisher_id: Option<i64>,
    pub name: String,
    pub platform: String,
    #[serde(default)]
    pub store_id: Option<i64>,
    #[serde(default)]
    pub bundle_id: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

impl GamePayload {
    /// Boundary validation, before any storage call.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must be non-empty".to_string());
        }
        if self.platform.trim().is_empty() {
            return Err("platform must be non-empty".to_string());
        }
        Ok(())
    }
}

/// Search filters; absent fields impose no constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
