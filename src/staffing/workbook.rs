use crate::error::StaffingError;
use crate::staffing::report::REPORT_HEADER;
use crate::staffing::schema::InputSchema;
use crate::staffing::shift::{RawCell, RawShiftRow, ReportRow};
use std::{
    collections::HashMap,
    fmt::Display,
    io::{Read, Seek},
};

use calamine::{Data, Reader};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, XlsxError};
use tracing::{info, warn};

const HOUR_COLUMN_WIDTH: f64 = 20.;

struct ColumnIndex {
    day: usize,
    start: usize,
    end: usize,
    duration: usize,
    row_type: Option<usize>,
}

/// Reads the data rows of the timesheet sheet described by `schema`.
pub fn read_shift_rows<RS, R>(
    workbook: &mut R,
    schema: &InputSchema,
) -> Result<Vec<RawShiftRow>, StaffingError>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let sheet_name = find_sheet(workbook.sheet_names(), &schema.sheet_name)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| StaffingError::UnreadableInput {
            path: sheet_name.clone(),
            reason: e.to_string(),
        })?;

    let first_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
    let header_offset = schema.skip_rows.checked_sub(first_row);
    let header = header_offset.and_then(|offset| range.rows().nth(offset));
    let columns = index_columns(header.unwrap_or(&[]), schema)?;

    let data_offset = header_offset.map(|offset| offset + 1).unwrap_or(usize::MAX);
    let rows: Vec<RawShiftRow> = range
        .rows()
        .enumerate()
        .skip(data_offset)
        .map(|(offset, row)| RawShiftRow {
            sheet_row: first_row + offset + 1,
            day_label: raw_cell(row, columns.day),
            start_time: raw_cell(row, columns.start),
            end_time: raw_cell(row, columns.end),
            declared_hours: raw_cell(row, columns.duration),
            row_type: columns.row_type.map(|col| raw_cell(row, col)),
        })
        .collect();

    info!(sheet = %sheet_name, rows = rows.len(), "read timesheet rows");
    Ok(rows)
}

fn find_sheet(sheet_names: Vec<String>, expected: &str) -> Result<String, StaffingError> {
    if let Some(name) = sheet_names
        .iter()
        .find(|name| name.trim() == expected.trim())
    {
        return Ok(name.clone());
    }

    if sheet_names.is_empty() {
        Err(StaffingError::MissingSheet {
            expected: expected.to_string(),
        })
    } else {
        Err(StaffingError::WrongExportVariant {
            expected: expected.to_string(),
            found: sheet_names,
        })
    }
}

fn index_columns(header: &[Data], schema: &InputSchema) -> Result<ColumnIndex, StaffingError> {
    let mut names: HashMap<String, usize> = HashMap::new();
    for (col, cell) in header.iter().enumerate() {
        let name = cell.to_string().trim().to_string();
        if !name.is_empty() {
            names.entry(name).or_insert(col);
        }
    }

    let require = |column: &str| {
        names
            .get(column.trim())
            .copied()
            .ok_or_else(|| StaffingError::MissingColumn {
                sheet: schema.sheet_name.clone(),
                column: column.to_string(),
            })
    };

    let row_type = match &schema.type_column {
        Some(column) => match names.get(column.trim()) {
            Some(col) => Some(*col),
            None if schema.require_type_column => {
                return Err(StaffingError::MissingColumn {
                    sheet: schema.sheet_name.clone(),
                    column: column.to_string(),
                })
            }
            None => {
                warn!(column = %column, "type column not found, keeping rows of every type");
                None
            }
        },
        None => None,
    };

    Ok(ColumnIndex {
        day: require(&schema.day_column)?,
        start: require(&schema.start_column)?,
        end: require(&schema.end_column)?,
        duration: require(&schema.duration_column)?,
        row_type,
    })
}

fn raw_cell(row: &[Data], col: usize) -> RawCell {
    match row.get(col) {
        None | Some(Data::Empty) | Some(Data::Error(_)) => RawCell::Empty,
        Some(Data::String(text)) => RawCell::Text(text.clone()),
        Some(Data::Float(value)) => RawCell::Number(*value),
        Some(Data::Int(value)) => RawCell::Number(*value as f64),
        Some(Data::Bool(value)) => RawCell::Text(value.to_string()),
        Some(Data::DateTime(value)) => RawCell::Serial(value.as_f64()),
        Some(Data::DateTimeIso(text)) | Some(Data::DurationIso(text)) => {
            RawCell::Text(text.clone())
        }
    }
}

/// Lays the report rows out on a single worksheet below the fixed header.
pub fn build_report_workbook(rows: &[ReportRow]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_align(FormatAlign::Center);
    let hour_format = Format::new().set_align(FormatAlign::Center);
    let hours_format = Format::new()
        .set_num_format("0.00")
        .set_align(FormatAlign::Center);

    let worksheet = workbook.add_worksheet();
    for (col, title) in REPORT_HEADER.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header_format)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let sheet_row = index as u32 + 1;
        match row {
            ReportRow::Blank => {}
            ReportRow::DateHeader(date) => {
                worksheet.write_string(sheet_row, 0, date.format("%Y-%m-%d").to_string())?;
            }
            ReportRow::Hour { hour, staff_hours } => {
                worksheet.write_string_with_format(sheet_row, 1, hour.to_string(), &hour_format)?;
                worksheet.write_number_with_format(sheet_row, 2, *staff_hours, &hours_format)?;
            }
        }
    }

    worksheet.set_column_width(1, HOUR_COLUMN_WIDTH)?;
    worksheet.set_column_width(2, HOUR_COLUMN_WIDTH)?;

    Ok(workbook)
}

pub fn report_to_bytes(rows: &[ReportRow]) -> Result<Vec<u8>, StaffingError> {
    let write_error = |e: XlsxError| StaffingError::WriteOutput {
        path: "<memory>".to_string(),
        reason: e.to_string(),
    };

    let mut workbook = build_report_workbook(rows).map_err(write_error)?;
    workbook.save_to_buffer().map_err(write_error)
}
