use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vigil_db::models::AttendanceRecord;
use vigil_services::{CheckInOutcome, CheckInRequest, report::AttendanceRow};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CheckInBody {
    pub verification_code: Option<String>,
    pub stream_title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub already_checked_in: bool,
    pub record: AttendanceRow,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub checked_in: bool,
    pub record: Option<AttendanceRow>,
}

fn row(record: AttendanceRecord, auth: &AuthUser) -> AttendanceRow {
    let mut row = AttendanceRow::from_record(record, None);
    row.full_name.get_or_insert_with(|| auth.identity.full_name().to_string());
    row.email.get_or_insert_with(|| auth.identity.email().to_string());
    row
}

pub async fn check_in(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<CheckInBody>>,
) -> Result<(StatusCode, Json<CheckInResponse>), ApiError> {
    let Json(body) = body.unwrap_or_default();
    let request = CheckInRequest {
        verification_code: body.verification_code,
        stream_title: body.stream_title,
    };

    let outcome = state
        .check_in
        .check_in(&auth.identity, request, Utc::now())
        .await?;

    let (status, already_checked_in, record) = match outcome {
        CheckInOutcome::CheckedIn(record) => (StatusCode::CREATED, false, record),
        CheckInOutcome::AlreadyCheckedIn(record) => (StatusCode::OK, true, record),
    };

    Ok((
        status,
        Json(CheckInResponse {
            already_checked_in,
            record: row(record, &auth),
        }),
    ))
}

pub async fn today(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TodayResponse>, ApiError> {
    let record = state.check_in.today(&auth.identity, Utc::now()).await?;

    Ok(Json(TodayResponse {
        checked_in: record.is_some(),
        record: record.map(|r| row(r, &auth)),
    }))
}
