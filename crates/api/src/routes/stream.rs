use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use vigil_db::models::StreamConfig;
use vigil_services::stream::{StreamEmbed, normalize_id, resolve_embed_lookup};

use crate::{
    error::ApiError,
    extractors::{admin::AdminUser, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SaveStreamConfigRequest {
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StreamConfigResponse {
    pub id: String,
    pub channel_id: Option<String>,
    pub video_id: Option<String>,
    pub is_active: bool,
    pub updated_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<StreamConfig> for StreamConfigResponse {
    fn from(config: StreamConfig) -> Self {
        Self {
            id: config.id.map(|id| id.to_hex()).unwrap_or_default(),
            channel_id: config.youtube_channel_id,
            video_id: config.youtube_video_id,
            is_active: config.is_active,
            updated_by: config.updated_by.map(|id| id.to_hex()),
            updated_at: config.updated_at.to_chrono(),
        }
    }
}

/// Embed target for the viewer page. Never fails: lookup errors fall back to the default channel.
pub async fn embed(State(state): State<AppState>, _auth: AuthUser) -> Json<StreamEmbed> {
    let lookup = state.stream_configs.find_active().await;
    Json(resolve_embed_lookup(
        lookup,
        &state.settings.stream.default_channel_id,
    ))
}

pub async fn get_config(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Option<StreamConfigResponse>>, ApiError> {
    let config = state.stream_configs.find_active().await?;
    Ok(Json(config.map(StreamConfigResponse::from)))
}

pub async fn save_config(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<SaveStreamConfigRequest>,
) -> Result<Json<StreamConfigResponse>, ApiError> {
    let config = state
        .stream_configs
        .save(
            normalize_id(body.channel_id),
            normalize_id(body.video_id),
            Some(admin.user_id),
        )
        .await?;

    info!(
        channel = ?config.youtube_channel_id,
        video = ?config.youtube_video_id,
        "Stream configuration updated"
    );
    Ok(Json(StreamConfigResponse::from(config)))
}
