use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::info;

use crate::models::{AttendanceRecord, Member, StreamConfig, UserRole};

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    // Members
    create_indexes(
        db,
        Member::COLLECTION,
        vec![index_unique(bson::doc! { "email": 1 })],
    )
    .await?;

    // Roles
    create_indexes(
        db,
        UserRole::COLLECTION,
        vec![index_unique(bson::doc! { "user_id": 1, "role": 1 })],
    )
    .await?;

    // Attendance. No uniqueness on (member, day): same-day dedup is a pre-check only.
    create_indexes(
        db,
        AttendanceRecord::COLLECTION,
        vec![
            index(bson::doc! { "join_time": -1 }),
            index(bson::doc! { "member_id": 1, "join_time": -1 }),
            index(bson::doc! { "guest_email": 1, "join_time": -1 }),
        ],
    )
    .await?;

    // Stream config
    create_indexes(
        db,
        StreamConfig::COLLECTION,
        vec![index(bson::doc! { "is_active": 1 })],
    )
    .await?;

    info!("All indexes ensured");
    Ok(())
}

async fn create_indexes(
    db: &Database,
    collection: &str,
    indexes: Vec<IndexModel>,
) -> Result<(), mongodb::error::Error> {
    let coll = db.collection::<bson::Document>(collection);
    coll.create_indexes(indexes).await?;
    Ok(())
}

fn index(keys: bson::Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn index_unique(keys: bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}
