use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub youtube_channel_id: Option<String>,
    pub youtube_video_id: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    pub updated_by: Option<ObjectId>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl StreamConfig {
    pub const COLLECTION: &'static str = "stream_config";
}
