use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vigil_services::{
    calendar::{self, DateRange},
    export::{export_file_name, pdf::export_attendance},
    report::{self, AttendanceRow, AttendanceStats},
};

use crate::{error::ApiError, extractors::admin::AdminUser, state::AppState};

/// Date inputs as sent by the filter form; empty strings mean "no bound".
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        Ok(DateRange::parse(self.start.as_deref(), self.end.as_deref())?)
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceListResponse {
    pub records: Vec<AttendanceRow>,
    pub stats: AttendanceStats,
}

async fn filtered(
    state: &AppState,
    range: &DateRange,
) -> Result<(Vec<AttendanceRow>, Vec<AttendanceRow>), ApiError> {
    let rows = report::load_recent(
        &state.attendance,
        &state.members,
        state.settings.attendance.list_limit,
    )
    .await?;
    let selected = report::filter_rows(&rows, range, state.tz);
    Ok((rows, selected))
}

pub async fn list_attendance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AttendanceListResponse>, ApiError> {
    let range = query.range()?;
    let (rows, selected) = filtered(&state, &range).await?;
    let stats = report::stats(&rows, &selected, Utc::now(), state.tz);

    Ok(Json(AttendanceListResponse {
        records: selected,
        stats,
    }))
}

pub async fn export_pdf(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<RangeQuery>,
) -> Result<Response, ApiError> {
    let range = query.range()?;
    let (_, selected) = filtered(&state, &range).await?;

    let today = calendar::local_date(Utc::now(), state.tz);
    let bytes = export_attendance(&selected, &range, today, state.tz)?;
    let file_name = export_file_name(&range, today);

    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
