use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::info;
use vigil_db::models::AttendanceRecord;

use crate::calendar;
use crate::dao::attendance::{AttendanceDao, NewAttendance};
use crate::dao::base::DaoResult;
use crate::identity::Identity;

#[derive(Debug, Clone, Default)]
pub struct CheckInRequest {
    pub verification_code: Option<String>,
    pub stream_title: Option<String>,
}

#[derive(Debug, Clone)]
pub enum CheckInOutcome {
    CheckedIn(AttendanceRecord),
    AlreadyCheckedIn(AttendanceRecord),
}

/// Records at most one check-in per identity per local calendar day.
///
/// The existence check and the insert are separate requests, so two
/// concurrent check-ins for the same identity can both be recorded.
pub struct CheckInService {
    attendance: Arc<AttendanceDao>,
    tz: Tz,
    default_title: String,
}

impl CheckInService {
    pub fn new(attendance: Arc<AttendanceDao>, tz: Tz, default_title: String) -> Self {
        Self {
            attendance,
            tz,
            default_title,
        }
    }

    /// Today's record for the identity, if it has checked in.
    pub async fn today(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> DaoResult<Option<AttendanceRecord>> {
        let today = calendar::local_date(now, self.tz);
        self.attendance
            .find_in_window(
                &identity.attendee_key(),
                calendar::start_of_day(today, self.tz),
                calendar::end_of_day(today, self.tz),
            )
            .await
    }

    pub async fn check_in(
        &self,
        identity: &Identity,
        request: CheckInRequest,
        now: DateTime<Utc>,
    ) -> DaoResult<CheckInOutcome> {
        if let Some(existing) = self.today(identity, now).await? {
            return Ok(CheckInOutcome::AlreadyCheckedIn(existing));
        }

        let stream_title = trimmed(request.stream_title).unwrap_or_else(|| self.default_title.clone());
        let record = self
            .attendance
            .create(NewAttendance {
                attendee: identity.attendee_key(),
                join_time: now,
                stream_title: Some(stream_title),
                verification_code: trimmed(request.verification_code),
            })
            .await?;

        info!(email = %identity.email(), "Checked in");
        Ok(CheckInOutcome::CheckedIn(record))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
