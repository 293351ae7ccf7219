use crate::error::StaffingError;
use crate::staffing::{
    aggregate::aggregate_buckets,
    extract::RecordExtractor,
    report::format_report,
    schema::InputSchema,
    shift::{AggregatedCell, AggregatedCellSummary, RawShiftRow},
    split::split_into_hour_buckets,
    workbook::{read_shift_rows, report_to_bytes},
};
use std::{
    io::Cursor,
    path::{Path, PathBuf},
};

use anyhow::Error;
use calamine::{open_workbook_auto, Reader, Xlsx};
use tracing::{info, warn};

pub fn summarize_hours_from_workbook(
    path: &Path,
    schema: &InputSchema,
) -> Result<Vec<AggregatedCell>, Error> {
    let mut workbook = open_workbook_auto(path).map_err(|e| StaffingError::UnreadableInput {
        path: path.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;
    let rows = read_shift_rows(&mut workbook, schema)?;

    summarize_rows(&rows, schema)
}

/// Runs the whole transform in memory: xlsx export in, xlsx report out.
pub fn summarize_workbook_bytes(bytes: &[u8], schema: &InputSchema) -> Result<Vec<u8>, Error> {
    let mut workbook =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| StaffingError::UnreadableInput {
            path: "<memory>".to_string(),
            reason: e.to_string(),
        })?;
    let rows = read_shift_rows(&mut workbook, schema)?;
    let cells = summarize_rows(&rows, schema)?;

    Ok(report_to_bytes(&format_report(&cells))?)
}

fn summarize_rows(
    rows: &[RawShiftRow],
    schema: &InputSchema,
) -> Result<Vec<AggregatedCell>, Error> {
    let attendance_marker = schema
        .type_column
        .as_ref()
        .map(|_| schema.attendance_marker.as_str());
    let extractor = RecordExtractor::new(attendance_marker)?;

    let records = extractor.extract_records(rows);
    let cells = aggregate_buckets(records.iter().flat_map(split_into_hour_buckets))?;

    Ok(cells)
}

/// `<dir>/<prefix><stem>.xlsx` next to the input file.
pub fn default_output_path(input: &Path, prefix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    input.with_file_name(format!("{prefix}{stem}.xlsx"))
}

/// Reads `input`, writes the staffing report and returns its path.
///
/// Both outputs are rendered before anything touches the disk. If the JSON
/// summary cannot be written, the report written just before is removed again.
pub fn run(
    input: &Path,
    output: Option<&Path>,
    json_output: Option<&Path>,
    schema: &InputSchema,
) -> Result<PathBuf, Error> {
    let cells = summarize_hours_from_workbook(input, schema)?;
    let rows = format_report(&cells);
    let report = report_to_bytes(&rows)?;

    let summary = match json_output {
        Some(json_path) => {
            let summaries: Vec<AggregatedCellSummary> =
                cells.iter().map(AggregatedCellSummary::from).collect();
            Some((json_path, serde_json::to_string_pretty(&summaries)?))
        }
        None => None,
    };

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(input, &schema.output_prefix));
    std::fs::write(&output, &report).map_err(|e| StaffingError::WriteOutput {
        path: output.to_string_lossy().to_string(),
        reason: e.to_string(),
    })?;
    info!(path = %output.display(), rows = rows.len(), "wrote staffing report");

    if let Some((json_path, summary)) = summary {
        if let Err(e) = std::fs::write(json_path, summary) {
            if let Err(cleanup) = std::fs::remove_file(&output) {
                warn!(path = %output.display(), "could not remove report: {cleanup}");
            }
            return Err(Error::from(e).context(format!(
                "Failed to create file: {}",
                json_path.to_string_lossy()
            )));
        }
        info!(path = %json_path.display(), cells = cells.len(), "wrote JSON summary");
    }

    Ok(output)
}
