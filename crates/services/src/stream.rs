use serde::Serialize;
use tracing::warn;
use vigil_db::models::StreamConfig;

use crate::dao::base::DaoResult;

const EMBED_BASE: &str = "https://www.youtube.com/embed";

/// Where the embedded player points.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StreamSource {
    Video(String),
    Channel(String),
    /// No usable configuration; the built-in channel is shown.
    Default(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StreamEmbed {
    pub source: StreamSource,
    pub embed_url: String,
    /// Link for viewers whose player fails to load.
    pub watch_url: String,
}

impl StreamEmbed {
    fn from_source(source: StreamSource) -> Self {
        let (embed_url, watch_url) = match &source {
            StreamSource::Video(id) => (
                format!("{EMBED_BASE}/{id}?autoplay=0"),
                format!("https://www.youtube.com/watch?v={id}"),
            ),
            StreamSource::Channel(id) | StreamSource::Default(id) => (
                format!("{EMBED_BASE}/live_stream?channel={id}&autoplay=0"),
                format!("https://www.youtube.com/channel/{id}/live"),
            ),
        };
        Self {
            source,
            embed_url,
            watch_url,
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// A video id always wins over a channel id.
pub fn resolve_embed(config: Option<&StreamConfig>, default_channel: &str) -> StreamEmbed {
    let source = config
        .and_then(|c| {
            non_blank(c.youtube_video_id.as_ref())
                .map(StreamSource::Video)
                .or_else(|| non_blank(c.youtube_channel_id.as_ref()).map(StreamSource::Channel))
        })
        .unwrap_or_else(|| StreamSource::Default(default_channel.to_string()));

    StreamEmbed::from_source(source)
}

/// Like [`resolve_embed`], but a failed lookup falls back to the default channel.
pub fn resolve_embed_lookup(
    lookup: DaoResult<Option<StreamConfig>>,
    default_channel: &str,
) -> StreamEmbed {
    match lookup {
        Ok(config) => resolve_embed(config.as_ref(), default_channel),
        Err(e) => {
            warn!(error = %e, "Stream config lookup failed, using default channel");
            resolve_embed(None, default_channel)
        }
    }
}

/// Form input to stored value: blank fields are stored as null.
pub fn normalize_id(raw: Option<String>) -> Option<String> {
    non_blank(raw.as_ref())
}
