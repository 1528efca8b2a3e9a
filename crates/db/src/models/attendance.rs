use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// One check-in event. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Absent for unverified identities.
    pub member_id: Option<ObjectId>,
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    pub join_time: DateTime,
    pub leave_time: Option<DateTime>,
    pub duration_minutes: Option<i32>,
    pub stream_title: Option<String>,
    pub verification_code: Option<String>,
    pub created_at: DateTime,
}

impl AttendanceRecord {
    pub const COLLECTION: &'static str = "attendance";
}
