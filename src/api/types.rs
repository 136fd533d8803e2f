use crate::emotion::EmotionLabel;
use crate::light::LightState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response body of `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub is_running: bool,
    pub current_emotion: String,
    pub confidence: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Response body of `POST /api/mappings`
#[derive(Debug, Clone, Serialize)]
pub struct MappingUpdateResponse {
    /// `updated` when every entry applied, `partial` otherwise
    pub status: &'static str,
    pub mappings: BTreeMap<EmotionLabel, LightState>,
    pub rejected: BTreeMap<String, String>,
}
