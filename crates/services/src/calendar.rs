//! Calendar-day arithmetic in the congregation's time zone.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Step used to find the first valid local time when a DST jump skips midnight.
const GAP_STEP_MINUTES: i64 = 15;

/// First instant of `date` in `tz`.
///
/// Where clocks jump forward over midnight, the day starts at the end of
/// the gap (e.g. 01:00 local).
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    let next_midnight = midnight
        .checked_add_signed(Duration::days(1))
        .unwrap_or(NaiveDateTime::MAX);

    let mut local = midnight;
    // A day skipped entirely (Pacific/Apia, 2011-12-30) starts where the next one does
    while local <= next_midnight {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return dt.with_timezone(&Utc);
        }
        match local.checked_add_signed(Duration::minutes(GAP_STEP_MINUTES)) {
            Some(next) => local = next,
            None => break,
        }
    }

    Utc.from_utc_datetime(&midnight)
}

/// Last millisecond of `date` in `tz` (23:59:59.999 local).
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    match date.checked_add_days(Days::new(1)) {
        Some(next) => start_of_day(next, tz) - Duration::milliseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
}

/// Optional inclusive bounds over calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Invalid {field} date '{value}', expected YYYY-MM-DD")]
    Malformed { field: &'static str, value: String },
    #[error("Start date {start} is after end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DateRangeError::Inverted { start, end });
            }
        }
        Ok(Self { start, end })
    }

    /// Parses raw query values. Blank strings count as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, DateRangeError> {
        let parse = |field: &'static str, value: Option<&str>| match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => parse_date(v).map(Some).map_err(|_| DateRangeError::Malformed {
                field,
                value: v.to_string(),
            }),
        };
        Self::new(parse("start", start)?, parse("end", end)?)
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        if let Some(start) = self.start {
            if instant < start_of_day(start, tz) {
                return false;
            }
        }
        if let Some(end) = self.end {
            if instant > end_of_day(end, tz) {
                return false;
            }
        }
        true
    }
}
