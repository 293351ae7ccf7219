use thiserror::Error;

/// Conditions that end a run without writing a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StaffingError {
    #[error("could not read timesheet export {path}: {reason}")]
    UnreadableInput { path: String, reason: String },

    #[error(
        "worksheet \"{expected}\" not found; this looks like a different export variant \
         (sheets: {}). Please export the report for all employees.",
        .found.join(", ")
    )]
    WrongExportVariant { expected: String, found: Vec<String> },

    #[error("worksheet \"{expected}\" is missing from the workbook")]
    MissingSheet { expected: String },

    #[error("worksheet \"{sheet}\" has no column \"{column}\"")]
    MissingColumn { sheet: String, column: String },

    #[error("no usable data: every row was rejected or covered no time")]
    NoUsableData,

    #[error("could not write report {path}: {reason}")]
    WriteOutput { path: String, reason: String },

    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}
