use bson::{doc, oid::ObjectId, DateTime, Document};
use chrono::Utc;
use mongodb::Database;
use vigil_db::models::AttendanceRecord;

use super::base::{BaseDao, DaoResult};

/// Who a check-in belongs to, as stored on the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendeeKey {
    Member(ObjectId),
    Guest { email: String, full_name: String },
}

impl AttendeeKey {
    fn filter(&self) -> Document {
        match self {
            AttendeeKey::Member(id) => doc! { "member_id": id },
            AttendeeKey::Guest { email, .. } => doc! { "member_id": null, "guest_email": email },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub attendee: AttendeeKey,
    pub join_time: chrono::DateTime<Utc>,
    pub stream_title: Option<String>,
    pub verification_code: Option<String>,
}

pub struct AttendanceDao {
    pub base: BaseDao<AttendanceRecord>,
}

impl AttendanceDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, AttendanceRecord::COLLECTION),
        }
    }

    pub async fn create(&self, new: NewAttendance) -> DaoResult<AttendanceRecord> {
        let (member_id, guest_email, guest_name) = match new.attendee {
            AttendeeKey::Member(id) => (Some(id), None, None),
            AttendeeKey::Guest { email, full_name } => (None, Some(email), Some(full_name)),
        };

        let record = AttendanceRecord {
            id: None,
            member_id,
            guest_email,
            guest_name,
            join_time: DateTime::from_chrono(new.join_time),
            leave_time: None,
            duration_minutes: None,
            stream_title: new.stream_title,
            verification_code: new.verification_code,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&record).await?;
        self.base.find_by_id(id).await
    }

    /// First record for the attendee whose join time lies in `[from, to]`.
    pub async fn find_in_window(
        &self,
        attendee: &AttendeeKey,
        from: chrono::DateTime<Utc>,
        to: chrono::DateTime<Utc>,
    ) -> DaoResult<Option<AttendanceRecord>> {
        let mut filter = attendee.filter();
        filter.insert(
            "join_time",
            doc! {
                "$gte": DateTime::from_chrono(from),
                "$lte": DateTime::from_chrono(to),
            },
        );
        self.base.find_one(filter).await
    }

    /// Most recent check-ins, newest first.
    pub async fn recent(&self, limit: i64) -> DaoResult<Vec<AttendanceRecord>> {
        self.base
            .find_many(doc! {}, Some(doc! { "join_time": -1 }), Some(limit))
            .await
    }
}
