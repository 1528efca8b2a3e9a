pub mod pdf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::calendar::{DATE_FORMAT, DateRange};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("No attendance records found for the selected date range")]
    EmptySelection,
}

/// `attendance_<start>_to_<end>.pdf` for a closed range, otherwise `attendance_<today>.pdf`.
pub fn export_file_name(range: &DateRange, today: NaiveDate) -> String {
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!(
            "attendance_{}_to_{}.pdf",
            start.format(DATE_FORMAT),
            end.format(DATE_FORMAT)
        ),
        _ => format!("attendance_{}.pdf", today.format(DATE_FORMAT)),
    }
}
