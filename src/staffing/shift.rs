use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A spreadsheet cell as seen by the record extractor, detached from the
/// workbook library that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    /// Excel date/time serial: days since 1899-12-30, fraction is the time of day.
    Serial(f64),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(text) => text.trim().is_empty(),
            RawCell::Number(_) | RawCell::Serial(_) => false,
        }
    }
}

/// One data row of the timesheet sheet, restricted to the columns we read.
#[derive(Debug, Clone, PartialEq)]
pub struct RawShiftRow {
    /// 1-based row number in the source sheet, used for log messages.
    pub sheet_row: usize,
    pub day_label: RawCell,
    pub start_time: RawCell,
    pub end_time: RawCell,
    pub declared_hours: RawCell,
    /// `None` when the sheet has no type column.
    pub row_type: Option<RawCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftRecord {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    /// Date of record combined with the end clock time, before any rollover.
    pub end: NaiveDateTime,
    pub declared_hours: f64,
}

impl ShiftRecord {
    /// The interval the shift actually covers.
    ///
    /// A shift without declared net hours covers nothing. Otherwise an end clock
    /// time earlier than the start rolls over into the next day, and a
    /// zero-width interval gets a synthetic end of `start + declared_hours`,
    /// for at most one day.
    pub fn effective_interval(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        if self.declared_hours.is_nan() || self.declared_hours <= 0. {
            return None;
        }

        if self.end > self.start {
            return Some((self.start, self.end));
        }

        if self.end < self.start {
            let end = self.end + Duration::days(1);
            return Some((self.start, end));
        }

        if self.declared_hours > 24. {
            return None;
        }
        let seconds = (self.declared_hours * 3600.).round() as i64;
        let end = self.start.checked_add_signed(Duration::try_seconds(seconds)?)?;
        Some((self.start, end))
    }

    pub fn effective_hours(&self) -> f64 {
        match self.effective_interval() {
            Some((start, end)) => (end - start).num_seconds() as f64 / 3600.,
            None => 0.,
        }
    }
}

/// A clock hour `00:00` to `23:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourLabel(u8);

impl HourLabel {
    /// Hours before this one are treated as the tail of the previous evening.
    pub const LATE_NIGHT_END: u8 = 5;

    pub fn new(hour: u32) -> Option<Self> {
        if hour < 24 {
            Some(Self(hour as u8))
        } else {
            None
        }
    }

    pub fn hour(self) -> u8 {
        self.0
    }

    /// Sort position within a date: 00:00-04:00 come after 23:00.
    pub fn order_key(self) -> u8 {
        if self.0 < Self::LATE_NIGHT_END {
            self.0 + 24
        } else {
            self.0
        }
    }
}

impl fmt::Display for HourLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

impl Serialize for HourLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Presence of one shift inside one clock hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketEntry {
    pub date: NaiveDate,
    pub hour: HourLabel,
    pub seconds: u32,
}

impl BucketEntry {
    pub fn fractional_hours(&self) -> f64 {
        self.seconds as f64 / 3600.
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatedCell {
    pub date: NaiveDate,
    pub hour: HourLabel,
    pub total_seconds: u64,
}

impl AggregatedCell {
    pub fn total_hours(&self) -> f64 {
        self.total_seconds as f64 / 3600.
    }

    /// Total hours rounded to two decimals for display.
    pub fn display_hours(&self) -> f64 {
        round_to_cents(self.total_hours())
    }
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.).round() / 100.
}

/// Serialized form of an aggregated cell for the JSON export.
#[derive(Serialize, Debug)]
pub struct AggregatedCellSummary {
    #[serde(rename(serialize = "Datum"))]
    pub date: String,
    #[serde(rename(serialize = "Stunde"))]
    pub hour: HourLabel,
    #[serde(rename(serialize = "Personalstunden"))]
    pub staff_hours: f64,
}

impl From<&AggregatedCell> for AggregatedCellSummary {
    fn from(cell: &AggregatedCell) -> Self {
        AggregatedCellSummary {
            date: cell.date.format("%Y-%m-%d").to_string(),
            hour: cell.hour,
            staff_hours: cell.display_hours(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportRow {
    Blank,
    DateHeader(NaiveDate),
    Hour { hour: HourLabel, staff_hours: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: &str, end: &str, declared_hours: f64) -> ShiftRecord {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        ShiftRecord {
            date,
            start: date.and_time(start.parse().unwrap()),
            end: date.and_time(end.parse().unwrap()),
            declared_hours,
        }
    }

    #[test]
    fn test_effective_interval_same_day() {
        let shift = record("08:00:00", "12:30:00", 4.5);
        let (start, end) = shift.effective_interval().unwrap();
        assert_eq!(start, shift.start);
        assert_eq!(end, shift.end);
        assert_eq!(shift.effective_hours(), 4.5);
    }

    #[test]
    fn test_effective_interval_rolls_over_midnight() {
        let shift = record("22:30:00", "00:30:00", 2.);
        let (_, end) = shift.effective_interval().unwrap();
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(shift.effective_hours(), 2.);
    }

    #[test]
    fn test_effective_interval_without_declared_hours_is_empty() {
        let overnight = record("23:00:00", "01:00:00", 0.);
        assert_eq!(overnight.effective_interval(), None);
        assert_eq!(overnight.effective_hours(), 0.);

        let daytime = record("08:00:00", "10:00:00", 0.);
        assert_eq!(daytime.effective_interval(), None);
    }

    #[test]
    fn test_effective_interval_zero_width_lasts_at_most_a_day() {
        assert_eq!(record("10:30:00", "10:30:00", 24.5).effective_interval(), None);
        assert_eq!(record("10:30:00", "10:30:00", 1e300).effective_interval(), None);
        assert_eq!(record("10:30:00", "10:30:00", f64::NAN).effective_interval(), None);

        let shift = record("10:30:00", "10:30:00", 24.);
        let (start, end) = shift.effective_interval().unwrap();
        assert_eq!(end - start, Duration::days(1));
    }

    #[test]
    fn test_effective_interval_zero_width_uses_declared_hours() {
        let shift = record("00:00:00", "00:00:00", 3.);
        let (start, end) = shift.effective_interval().unwrap();
        assert_eq!(end - start, Duration::hours(3));
    }

    #[test]
    fn test_effective_interval_zero_width_without_declared_hours_is_empty() {
        let shift = record("09:15:00", "09:15:00", 0.);
        assert_eq!(shift.effective_interval(), None);
        assert_eq!(shift.effective_hours(), 0.);
    }

    #[test]
    fn test_hour_label_order_key() {
        assert_eq!(HourLabel::new(0).unwrap().order_key(), 24);
        assert_eq!(HourLabel::new(4).unwrap().order_key(), 28);
        assert_eq!(HourLabel::new(5).unwrap().order_key(), 5);
        assert_eq!(HourLabel::new(23).unwrap().order_key(), 23);
        assert_eq!(HourLabel::new(24), None);
    }

    #[test]
    fn test_hour_label_display() {
        assert_eq!(HourLabel::new(7).unwrap().to_string(), "07:00");
        assert_eq!(HourLabel::new(23).unwrap().to_string(), "23:00");
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(0.999_999), 1.);
        assert_eq!(round_to_cents(1.234), 1.23);
        assert_eq!(round_to_cents(0.125), 0.13);
    }

    #[test]
    fn test_aggregated_cell_summary_serializes_german_keys() {
        let cell = AggregatedCell {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            hour: HourLabel::new(8).unwrap(),
            total_seconds: 5400,
        };
        let json = serde_json::to_string(&AggregatedCellSummary::from(&cell)).unwrap();
        assert_eq!(
            json,
            r#"{"Datum":"2024-06-03","Stunde":"08:00","Personalstunden":1.5}"#
        );
    }
}
