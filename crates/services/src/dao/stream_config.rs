use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use vigil_db::models::StreamConfig;

use super::base::{BaseDao, DaoResult};

pub struct StreamConfigDao {
    pub base: BaseDao<StreamConfig>,
}

impl StreamConfigDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, StreamConfig::COLLECTION),
        }
    }

    /// The row currently shown to viewers, if one has ever been saved.
    pub async fn find_active(&self) -> DaoResult<Option<StreamConfig>> {
        self.base
            .find_one(doc! { "is_active": true })
            .await
    }

    /// Updates the active row in place, or inserts the first active row.
    pub async fn save(
        &self,
        channel_id: Option<String>,
        video_id: Option<String>,
        updated_by: Option<ObjectId>,
    ) -> DaoResult<StreamConfig> {
        let existing = self.find_active().await?;

        let id = match existing.and_then(|c| c.id) {
            Some(id) => {
                self.base
                    .update_by_id(
                        id,
                        doc! {
                            "$set": {
                                "youtube_channel_id": channel_id,
                                "youtube_video_id": video_id,
                                "updated_by": updated_by,
                            }
                        },
                    )
                    .await?;
                id
            }
            None => {
                let now = DateTime::now();
                let config = StreamConfig {
                    id: None,
                    youtube_channel_id: channel_id,
                    youtube_video_id: video_id,
                    is_active: true,
                    updated_by,
                    created_at: now,
                    updated_at: now,
                };
                self.base.insert_one(&config).await?
            }
        };

        self.base.find_by_id(id).await
    }
}
