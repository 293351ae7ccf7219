use crate::staffing::shift::{BucketEntry, HourLabel, ShiftRecord};

use chrono::{Duration, NaiveDateTime, Timelike};

/// Spreads one shift over the clock hours it touches.
///
/// Every bucket is keyed to the shift's date of record, even when its clock
/// hour lies after midnight. Each clock hour appears once: a shift that wraps
/// back into its starting hour on the next day adds that tail to the first
/// bucket. Seconds add up to the shift's effective duration.
pub fn split_into_hour_buckets(shift: &ShiftRecord) -> Vec<BucketEntry> {
    let Some((start, end)) = shift.effective_interval() else {
        return vec![];
    };

    let mut buckets: Vec<BucketEntry> = vec![];
    let mut hour_start = truncate_to_hour(start);
    while hour_start < end {
        let hour_end = hour_start + Duration::hours(1);
        let overlap = hour_end.min(end) - hour_start.max(start);
        let seconds = overlap.num_seconds();

        if seconds > 0 {
            if let Some(hour) = HourLabel::new(hour_start.hour()) {
                match buckets.first_mut() {
                    Some(first) if first.hour == hour => first.seconds += seconds as u32,
                    _ => buckets.push(BucketEntry {
                        date: shift.date,
                        hour,
                        seconds: seconds as u32,
                    }),
                }
            }
        }
        hour_start = hour_end;
    }

    buckets
}

fn truncate_to_hour(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.date().and_time(Default::default()) + Duration::hours(timestamp.hour() as i64)
}
