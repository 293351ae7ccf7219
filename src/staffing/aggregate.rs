use crate::error::StaffingError;
use crate::staffing::shift::{AggregatedCell, BucketEntry, HourLabel};
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

/// Sums bucket entries per (date, hour).
///
/// Presence is accumulated in whole seconds, so the result does not depend on
/// the order of the entries. Cells are sorted by date, then by
/// [`HourLabel::order_key`], which places 00:00-04:00 after 23:00 of the same
/// date.
pub fn aggregate_buckets<I>(entries: I) -> Result<Vec<AggregatedCell>, StaffingError>
where
    I: IntoIterator<Item = BucketEntry>,
{
    let mut totals: HashMap<(NaiveDate, HourLabel), u64> = HashMap::new();
    let mut entry_count = 0usize;
    for entry in entries {
        entry_count += 1;
        *totals.entry((entry.date, entry.hour)).or_insert(0) += entry.seconds as u64;
    }

    if totals.is_empty() {
        return Err(StaffingError::NoUsableData);
    }

    let mut cells: Vec<AggregatedCell> = totals
        .into_iter()
        .map(|((date, hour), total_seconds)| AggregatedCell {
            date,
            hour,
            total_seconds,
        })
        .collect();
    cells.sort_by_key(|cell| (cell.date, cell.hour.order_key()));

    info!(
        entries = entry_count,
        cells = cells.len(),
        "aggregated hour buckets"
    );
    Ok(cells)
}
