use crate::staffing::shift::{AggregatedCell, ReportRow};

pub const REPORT_HEADER: [&str; 3] = ["Datum", "Stunde", "Personalstunden"];

/// Lays out sorted cells as report rows: per date a blank row, a date row and
/// one row per hour bucket.
pub fn format_report(cells: &[AggregatedCell]) -> Vec<ReportRow> {
    let mut rows = vec![];
    let mut current_date = None;

    for cell in cells {
        if current_date != Some(cell.date) {
            rows.push(ReportRow::Blank);
            rows.push(ReportRow::DateHeader(cell.date));
            current_date = Some(cell.date);
        }
        rows.push(ReportRow::Hour {
            hour: cell.hour,
            staff_hours: cell.display_hours(),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use crate::staffing::shift::HourLabel;
    use chrono::NaiveDate;

    use super::*;

    fn cell(day: u32, hour: u32, total_seconds: u64) -> AggregatedCell {
        AggregatedCell {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            hour: HourLabel::new(hour).unwrap(),
            total_seconds,
        }
    }

    #[test]
    fn test_format_report_groups_rows_by_date() {
        let rows = format_report(&[cell(3, 8, 3600), cell(3, 9, 5400), cell(4, 22, 1800)]);

        assert_eq!(
            rows,
            vec![
                ReportRow::Blank,
                ReportRow::DateHeader(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
                ReportRow::Hour {
                    hour: HourLabel::new(8).unwrap(),
                    staff_hours: 1.
                },
                ReportRow::Hour {
                    hour: HourLabel::new(9).unwrap(),
                    staff_hours: 1.5
                },
                ReportRow::Blank,
                ReportRow::DateHeader(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap()),
                ReportRow::Hour {
                    hour: HourLabel::new(22).unwrap(),
                    staff_hours: 0.5
                },
            ]
        );
    }

    #[test]
    fn test_format_report_rounds_to_two_decimals() {
        let rows = format_report(&[cell(3, 8, 1000)]);
        assert_eq!(
            rows[2],
            ReportRow::Hour {
                hour: HourLabel::new(8).unwrap(),
                staff_hours: 0.28
            }
        );
    }

    #[test]
    fn test_format_report_of_nothing_is_empty() {
        assert!(format_report(&[]).is_empty());
    }
}
