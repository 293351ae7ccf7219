use crate::staffing::shift::{RawCell, RawShiftRow, ShiftRecord};

use anyhow::{Context, Error};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use tracing::{debug, info};

/// `D.M.YYYY` anywhere in the label, not glued to other digits.
const DATE_PATTERN: &str = r"(?:^|\D)(\d{1,2})\.(\d{1,2})\.(\d{4})(?:\D|$)";

/// Longest declared net duration accepted for a single shift.
const MAX_DECLARED_HOURS: f64 = 24.;

const SECONDS_PER_DAY: f64 = 86_400.;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Why a row was left out of the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    NotAttendance,
    MissingDayLabel,
    NoDateInLabel,
    InvalidStartTime,
    InvalidEndTime,
    InvalidDuration,
}

pub struct RecordExtractor {
    date_pattern: Regex,
    attendance_marker: Option<String>,
}

impl RecordExtractor {
    /// `attendance_marker` restricts rows that carry a type to that type.
    pub fn new(attendance_marker: Option<&str>) -> Result<Self, Error> {
        let date_pattern =
            Regex::new(DATE_PATTERN).with_context(|| "date pattern failed to compile")?;

        Ok(RecordExtractor {
            date_pattern,
            attendance_marker: attendance_marker.map(|marker| marker.trim().to_lowercase()),
        })
    }

    /// Keeps the rows that describe a usable shift, in input order.
    pub fn extract_records(&self, rows: &[RawShiftRow]) -> Vec<ShiftRecord> {
        let records: Vec<ShiftRecord> = rows
            .iter()
            .filter_map(|row| match self.validate_row(row) {
                Ok(record) => Some(record),
                Err(reason) => {
                    debug!(row = row.sheet_row, ?reason, "dropping timesheet row");
                    None
                }
            })
            .collect();

        info!(
            rows = rows.len(),
            accepted = records.len(),
            "extracted shift records"
        );
        records
    }

    pub fn validate_row(&self, row: &RawShiftRow) -> Result<ShiftRecord, RowRejection> {
        if let (Some(marker), Some(row_type)) = (&self.attendance_marker, &row.row_type) {
            if !is_attendance(row_type, marker) {
                return Err(RowRejection::NotAttendance);
            }
        }

        if row.day_label.is_empty() {
            return Err(RowRejection::MissingDayLabel);
        }
        let date = self
            .date_from_cell(&row.day_label)
            .ok_or(RowRejection::NoDateInLabel)?;

        let start_time = parse_clock_time(&row.start_time).ok_or(RowRejection::InvalidStartTime)?;
        let end_time = parse_clock_time(&row.end_time).ok_or(RowRejection::InvalidEndTime)?;
        let declared_hours =
            parse_declared_hours(&row.declared_hours).ok_or(RowRejection::InvalidDuration)?;

        Ok(ShiftRecord {
            date,
            start: date.and_time(start_time),
            end: date.and_time(end_time),
            declared_hours,
        })
    }

    /// First `D.M.YYYY` date in a free-text label such as `"Mo 3.6.2024 Frühdienst"`.
    ///
    /// Returns `None` when there is no such pattern or the first one is not a
    /// real calendar date.
    pub fn extract_date(&self, label: &str) -> Option<NaiveDate> {
        let captures = self.date_pattern.captures(label)?;
        let day = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let year = captures[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn date_from_cell(&self, cell: &RawCell) -> Option<NaiveDate> {
        match cell {
            RawCell::Text(label) => self.extract_date(label),
            RawCell::Serial(serial) => serial_to_datetime(*serial).map(|datetime| datetime.date()),
            RawCell::Number(_) | RawCell::Empty => None,
        }
    }
}

fn is_attendance(cell: &RawCell, marker: &str) -> bool {
    match cell {
        RawCell::Text(text) => text.trim().to_lowercase() == marker,
        _ => false,
    }
}

/// Clock time of a start/end cell, truncated to whole minutes.
pub fn parse_clock_time(cell: &RawCell) -> Option<NaiveTime> {
    let time = match cell {
        RawCell::Text(text) => parse_time_text(text.trim())?,
        RawCell::Number(fraction) if (0. ..1.).contains(fraction) => {
            day_fraction_to_time(*fraction)?
        }
        RawCell::Serial(serial) if *serial >= 0. => day_fraction_to_time(serial.fract())?,
        _ => return None,
    };

    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
}

fn parse_time_text(text: &str) -> Option<NaiveTime> {
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(time);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.time());
        }
    }
    None
}

fn day_fraction_to_time(fraction: f64) -> Option<NaiveTime> {
    let seconds = (fraction * SECONDS_PER_DAY).round();
    if !(0. ..SECONDS_PER_DAY).contains(&seconds) {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(seconds as u32, 0)
}

/// Excel serial (days since 1899-12-30) to a timestamp, to the second.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0. {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}

/// Declared net hours: a number, or text using `.` or `,` as decimal separator.
pub fn parse_declared_hours(cell: &RawCell) -> Option<f64> {
    let hours = match cell {
        RawCell::Number(value) => *value,
        RawCell::Serial(days) => days * 24.,
        RawCell::Text(text) => text.trim().replace(',', ".").parse::<f64>().ok()?,
        RawCell::Empty => return None,
    };

    if hours.is_finite() && (0. ..=MAX_DECLARED_HOURS).contains(&hours) {
        Some(hours)
    } else {
        None
    }
}
