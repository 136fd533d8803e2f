use crate::emotion::{EmotionLabel, SmoothedState};
use crate::events::{LightSource, MoodEvent};
use crate::light::{LightSpec, LightState};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::error::{ApiError, ApiJson};
use super::server::AppState;
use super::types::{MappingUpdateResponse, SystemStatus};

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Mood Lighting API is running",
        "status": "ok",
    }))
}

/// Health check with a short summary of the running system
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "detection": state.session.state(),
        "event_subscribers": state.event_bus.subscriber_count(),
        "mappings": state.mappings.len(),
        "light_sink": state.light.name(),
        "timestamp": Utc::now(),
    }))
}

pub async fn status_handler(State(state): State<AppState>) -> Json<SystemStatus> {
    let current = state.emotion.get();
    Json(SystemStatus {
        is_running: state.session.is_running(),
        current_emotion: current.label.to_string(),
        confidence: current.confidence,
        timestamp: current.timestamp,
    })
}

pub async fn start_detection_handler(State(state): State<AppState>) -> ApiResult<Value> {
    state.session.start().await?;
    Ok(Json(json!({
        "status": "started",
        "message": "Emotion detection started",
    })))
}

pub async fn stop_detection_handler(State(state): State<AppState>) -> ApiResult<Value> {
    state.session.stop().await?;
    Ok(Json(json!({
        "status": "stopped",
        "message": "Emotion detection stopped",
    })))
}

pub async fn current_emotion_handler(State(state): State<AppState>) -> Json<SmoothedState> {
    Json(state.emotion.get())
}

pub async fn get_mappings_handler(
    State(state): State<AppState>,
) -> Json<BTreeMap<EmotionLabel, LightState>> {
    Json(state.mappings.snapshot())
}

/// Replace several mappings; valid entries are kept even when others fail
pub async fn update_mappings_handler(
    State(state): State<AppState>,
    ApiJson(updates): ApiJson<HashMap<String, LightSpec>>,
) -> Json<MappingUpdateResponse> {
    debug!("Bulk mapping update with {} entries", updates.len());
    let report = state.mappings.set_bulk(updates);

    Json(MappingUpdateResponse {
        status: if report.is_complete() {
            "updated"
        } else {
            "partial"
        },
        mappings: state.mappings.snapshot(),
        rejected: report.rejected,
    })
}

pub async fn update_mapping_handler(
    State(state): State<AppState>,
    Path(emotion): Path<String>,
    ApiJson(spec): ApiJson<LightSpec>,
) -> ApiResult<Value> {
    let label = EmotionLabel::new(&emotion)?;
    let mapping = state.mappings.set(label.as_str(), spec)?;
    info!("Mapping for {} updated", label);

    Ok(Json(json!({
        "status": "updated",
        "emotion": label,
        "mapping": mapping,
    })))
}

/// Drive the light directly, bypassing the mapping table
pub async fn control_light_handler(
    State(state): State<AppState>,
    ApiJson(spec): ApiJson<LightSpec>,
) -> ApiResult<Value> {
    let light = LightState::try_from(spec)?;
    state.light.apply(&light).await?;

    let _ = state.event_bus.publish(MoodEvent::LightApplied {
        color: light.color().to_string(),
        brightness: light.brightness(),
        source: LightSource::Manual,
        emotion: None,
        timestamp: Utc::now(),
    });

    Ok(Json(json!({
        "status": "success",
        "light_state": light,
    })))
}

pub async fn light_state_handler(State(state): State<AppState>) -> Json<Option<LightState>> {
    Json(state.light.current_state())
}
