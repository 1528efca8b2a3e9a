use std::collections::{HashMap, HashSet};

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use vigil_db::models::{AttendanceRecord, Member};

use crate::calendar::{self, DateRange};
use crate::dao::{attendance::AttendanceDao, base::DaoResult, member::MemberDao};

/// An attendance record joined with the attendee's name and email.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceRow {
    pub id: String,
    pub member_id: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub join_time: DateTime<Utc>,
    pub leave_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub stream_title: Option<String>,
    pub verification_code: Option<String>,
}

impl AttendanceRow {
    pub fn from_record(record: AttendanceRecord, member: Option<&Member>) -> Self {
        let (full_name, email) = match member {
            Some(m) => (Some(m.full_name.clone()), Some(m.email.clone())),
            None => (record.guest_name, record.guest_email),
        };

        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            member_id: record.member_id.map(|id| id.to_hex()),
            full_name,
            email,
            join_time: record.join_time.to_chrono(),
            leave_time: record.leave_time.map(|t| t.to_chrono()),
            duration_minutes: record.duration_minutes,
            stream_title: record.stream_title,
            verification_code: record.verification_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceStats {
    pub total_records: usize,
    pub today_count: usize,
    pub filtered_count: usize,
    pub current_date: NaiveDate,
}

/// Loads the newest `limit` check-ins with member details attached.
pub async fn load_recent(
    attendance: &AttendanceDao,
    members: &MemberDao,
    limit: i64,
) -> DaoResult<Vec<AttendanceRow>> {
    let records = attendance.recent(limit).await?;

    let member_ids: Vec<ObjectId> = records
        .iter()
        .filter_map(|r| r.member_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let member_map: HashMap<ObjectId, Member> = members.find_by_ids(&member_ids).await?;

    Ok(records
        .into_iter()
        .map(|record| {
            let member = record.member_id.and_then(|id| member_map.get(&id));
            AttendanceRow::from_record(record, member)
        })
        .collect())
}

pub fn filter_rows(rows: &[AttendanceRow], range: &DateRange, tz: Tz) -> Vec<AttendanceRow> {
    rows.iter()
        .filter(|row| range.contains(row.join_time, tz))
        .cloned()
        .collect()
}

/// Rows whose local calendar date is `today`.
pub fn today_count(rows: &[AttendanceRow], today: NaiveDate, tz: Tz) -> usize {
    rows.iter()
        .filter(|row| calendar::local_date(row.join_time, tz) == today)
        .count()
}

pub fn stats(
    rows: &[AttendanceRow],
    filtered: &[AttendanceRow],
    now: DateTime<Utc>,
    tz: Tz,
) -> AttendanceStats {
    let today = calendar::local_date(now, tz);
    AttendanceStats {
        total_records: rows.len(),
        today_count: today_count(rows, today, tz),
        filtered_count: filtered.len(),
        current_date: today,
    }
}
