use chrono::NaiveDate;
use chrono_tz::Tz;

use super::ExportError;
use crate::calendar::DateRange;
use crate::report::AttendanceRow;

const HUMAN_DATE: &str = "%b %d, %Y";
const HUMAN_DATE_TIME: &str = "%b %d, %Y %H:%M";

const PAGE_WIDTH: f64 = 612.0; // Letter
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 40.0;
const ROW_HEIGHT: f64 = 14.0;
const CELL_FONT_SIZE: f64 = 9.0;

/// (header, x offset, width)
const COLUMNS: [(&str, f64, f64); 5] = [
    ("Name", 0.0, 110.0),
    ("Email", 110.0, 150.0),
    ("Stream", 260.0, 100.0),
    ("Join Time", 360.0, 100.0),
    ("Duration (min)", 460.0, 72.0),
];

/// Renders the attendance table. Refuses to produce a document for an empty selection.
pub fn export_attendance(
    rows: &[AttendanceRow],
    range: &DateRange,
    generated_on: NaiveDate,
    tz: Tz,
) -> Result<Vec<u8>, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::EmptySelection);
    }

    let mut pdf = TablePdf::new();
    pdf.text(MARGIN, PAGE_HEIGHT - 50.0, 18.0, true, "Attendance Report");
    pdf.text(MARGIN, PAGE_HEIGHT - 70.0, 11.0, false, &subtitle(range, generated_on));
    pdf.text(
        MARGIN,
        PAGE_HEIGHT - 86.0,
        9.0,
        false,
        &format!("Records: {}", rows.len()),
    );

    let mut y = PAGE_HEIGHT - 110.0;
    pdf.header_row(y);
    y -= ROW_HEIGHT;

    for row in rows {
        let values = cells(row, tz);
        let wrapped: [Vec<String>; 5] =
            std::array::from_fn(|i| wrap(&values[i], COLUMNS[i].2, CELL_FONT_SIZE));
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = lines as f64 * ROW_HEIGHT;

        if y - height + ROW_HEIGHT < MARGIN {
            pdf.new_page();
            y = PAGE_HEIGHT - MARGIN;
            pdf.header_row(y);
            y -= ROW_HEIGHT;
        }
        pdf.cells(y, &wrapped, false);
        y -= height;
    }

    Ok(pdf.render())
}

pub fn subtitle(range: &DateRange, generated_on: NaiveDate) -> String {
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!(
            "Period: {} - {}",
            start.format(HUMAN_DATE),
            end.format(HUMAN_DATE)
        ),
        (Some(start), None) => format!("From: {}", start.format(HUMAN_DATE)),
        (None, Some(end)) => format!("Until: {}", end.format(HUMAN_DATE)),
        (None, None) => format!("Generated: {}", generated_on.format(HUMAN_DATE)),
    }
}

fn cells(row: &AttendanceRow, tz: Tz) -> [String; 5] {
    [
        row.full_name.clone().unwrap_or_else(|| "N/A".to_string()),
        row.email.clone().unwrap_or_else(|| "N/A".to_string()),
        row.stream_title.clone().unwrap_or_else(|| "-".to_string()),
        row.join_time
            .with_timezone(&tz)
            .format(HUMAN_DATE_TIME)
            .to_string(),
        row.duration_minutes
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string()),
    ]
}

/// Minimal multi-page PDF 1.4 writer using the built-in Helvetica fonts.
struct TablePdf {
    pages: Vec<String>,
}

impl TablePdf {
    fn new() -> Self {
        Self {
            pages: vec![String::new()],
        }
    }

    fn new_page(&mut self) {
        self.pages.push(String::new());
    }

    fn current(&mut self) -> &mut String {
        if self.pages.is_empty() {
            self.pages.push(String::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn text(&mut self, x: f64, y: f64, size: f64, bold: bool, text: &str) {
        let font = if bold { "/F2" } else { "/F1" };
        let escaped = escape_pdf_string(text);
        self.current().push_str(&format!(
            "BT\n{font} {size} Tf\n1 0 0 1 {x:.2} {y:.2} Tm\n({escaped}) Tj\nET\n"
        ));
    }

    fn rule(&mut self, y: f64) {
        let right = PAGE_WIDTH - MARGIN;
        self.current()
            .push_str(&format!("0.5 w\n{MARGIN} {y:.2} m\n{right} {y:.2} l\nS\n"));
    }

    /// Draws each column's lines downward from `y`.
    fn cells(&mut self, y: f64, columns: &[Vec<String>; 5], bold: bool) {
        for ((_, offset, _), lines) in COLUMNS.iter().zip(columns) {
            for (i, line) in lines.iter().enumerate() {
                self.text(
                    MARGIN + offset,
                    y - i as f64 * ROW_HEIGHT,
                    CELL_FONT_SIZE,
                    bold,
                    line,
                );
            }
        }
    }

    fn header_row(&mut self, y: f64) {
        let headers = COLUMNS.map(|(name, _, _)| vec![name.to_string()]);
        self.cells(y, &headers, true);
        self.rule(y - 4.0);
    }

    fn render(&self) -> Vec<u8> {
        let mut buf: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = Vec::new();

        buf.extend_from_slice(b"%PDF-1.4\n");
        // Binary comment marks the file as binary
        buf.extend_from_slice(&[b'%', 0xE2, 0xE3, 0xCF, 0xD3, b'\n']);

        // Objects 1-4 are fixed; each page then takes a page object and a content object.
        let page_ids: Vec<usize> = (0..self.pages.len()).map(|i| 5 + i * 2).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        let mut object = |buf: &mut Vec<u8>, body: &str| {
            offsets.push(buf.len());
            let id = offsets.len();
            buf.extend_from_slice(format!("{id} 0 obj\n{body}\nendobj\n").as_bytes());
        };

        object(&mut buf, "<< /Type /Catalog /Pages 2 0 R >>");
        object(
            &mut buf,
            &format!(
                "<< /Type /Pages /Kids [{kids}] /Count {} >>",
                self.pages.len()
            ),
        );
        object(
            &mut buf,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
        );
        object(
            &mut buf,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
        );

        for (page, content_id) in self.pages.iter().zip(page_ids.iter().map(|id| id + 1)) {
            object(
                &mut buf,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                     /Contents {content_id} 0 R /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> >>"
                ),
            );
            object(
                &mut buf,
                &format!("<< /Length {} >>\nstream\n{page}\nendstream", page.len()),
            );
        }

        let xref_start = buf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
            offsets.len() + 1
        ));
        buf.extend_from_slice(tail.as_bytes());

        buf
    }
}

/// Escapes a PDF literal string. WinAnsi covers Latin-1 above U+00A0; anything
/// outside printable ASCII and that block becomes `?`.
fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => out.push('?'),
        }
    }
    out
}

/// Splits `value` into lines of roughly `width` points of Helvetica at `size`.
///
/// Lines break after a space or before an `@`; a run with neither is cut hard.
fn wrap(value: &str, width: f64, size: f64) -> Vec<String> {
    let max_chars = ((width / (size * 0.5)).floor() as usize).max(1);
    let mut rest: Vec<char> = value.chars().collect();
    let mut lines = Vec::new();

    while rest.len() > max_chars {
        let cut = (1..=max_chars)
            .rev()
            .find(|&i| rest[i - 1] == ' ' || rest[i] == '@')
            .unwrap_or(max_chars);
        let line: String = rest.drain(..cut).collect();
        lines.push(line.trim_end().to_string());
    }
    lines.push(rest.into_iter().collect());
    lines
}
