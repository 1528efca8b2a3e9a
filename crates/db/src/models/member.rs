use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// A verified account. Attendance listings join against this for name and email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Member {
    pub const COLLECTION: &'static str = "members";
}
