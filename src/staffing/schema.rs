use std::{io::BufReader, path::Path};

use anyhow::{Context, Error};
use serde::Deserialize;

use crate::error::StaffingError;

/// Where the timesheet export keeps its data and how the report is named.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InputSchema {
    pub sheet_name: String,
    /// Sheet rows above the column header.
    pub skip_rows: usize,
    pub day_column: String,
    pub start_column: String,
    pub end_column: String,
    pub duration_column: String,
    pub type_column: Option<String>,
    pub attendance_marker: String,
    pub require_type_column: bool,
    pub output_prefix: String,
}

impl Default for InputSchema {
    fn default() -> Self {
        InputSchema {
            sheet_name: "Alle Mitarbeiter".to_string(),
            skip_rows: 6,
            day_column: "Tag".to_string(),
            start_column: "Startzeit".to_string(),
            end_column: "Endzeit".to_string(),
            duration_column: "Dauer netto (dezimal)".to_string(),
            type_column: Some("Typ".to_string()),
            attendance_marker: "Anwesenheit".to_string(),
            require_type_column: false,
            output_prefix: "Stundenanalyse_".to_string(),
        }
    }
}

impl InputSchema {
    pub fn from_json_file(path: &Path) -> Result<InputSchema, Error> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open schema file: {}", path.to_string_lossy()))?;

        let reader = BufReader::new(file);
        let schema: InputSchema = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse schema file: {}", path.to_string_lossy()))?;
        schema.validate()?;

        Ok(schema)
    }

    pub fn validate(&self) -> Result<(), StaffingError> {
        let named = [
            ("sheet_name", self.sheet_name.as_str()),
            ("day_column", self.day_column.as_str()),
            ("start_column", self.start_column.as_str()),
            ("end_column", self.end_column.as_str()),
            ("duration_column", self.duration_column.as_str()),
            ("output_prefix", self.output_prefix.as_str()),
        ];
        for (field, value) in named {
            if value.trim().is_empty() {
                return Err(StaffingError::InvalidSchema(format!("{field} must not be empty")));
            }
        }

        if let Some(column) = &self.type_column {
            if column.trim().is_empty() {
                return Err(StaffingError::InvalidSchema(
                    "type_column must not be empty when set".to_string(),
                ));
            }
            if self.attendance_marker.trim().is_empty() {
                return Err(StaffingError::InvalidSchema(
                    "attendance_marker must not be empty when type_column is set".to_string(),
                ));
            }
        } else if self.require_type_column {
            return Err(StaffingError::InvalidSchema(
                "require_type_column needs a type_column".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, str::FromStr};

    use super::*;

    #[test]
    fn test_default_schema_matches_export_layout() {
        let schema = InputSchema::default();
        assert_eq!(schema.sheet_name, "Alle Mitarbeiter");
        assert_eq!(schema.skip_rows, 6);
        assert_eq!(schema.duration_column, "Dauer netto (dezimal)");
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_read_partial_schema_keeps_defaults() {
        let path = PathBuf::from_str("./test_datasets/schema_custom_columns.json").unwrap();
        let schema = InputSchema::from_json_file(&path).unwrap();

        assert_eq!(schema.sheet_name, "Export");
        assert_eq!(schema.skip_rows, 0);
        assert_eq!(schema.start_column, "Beginn");
        assert_eq!(schema.end_column, "Ende");
        assert_eq!(schema.day_column, "Tag");
        assert_eq!(schema.type_column, None);
        assert_eq!(schema.output_prefix, "Stundenanalyse_");
    }

    #[test]
    fn test_read_schema_rejects_unknown_fields() {
        let path = PathBuf::from_str("./test_datasets/schema_unknown_field.json").unwrap();
        assert!(InputSchema::from_json_file(&path).is_err());
    }

    #[test]
    fn test_read_schema_rejects_required_type_without_column() {
        let path = PathBuf::from_str("./test_datasets/schema_require_missing_type.json").unwrap();
        let err = InputSchema::from_json_file(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StaffingError>(),
            Some(StaffingError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_column_name() {
        let schema = InputSchema {
            end_column: "  ".to_string(),
            ..InputSchema::default()
        };
        assert_eq!(
            schema.validate(),
            Err(StaffingError::InvalidSchema("end_column must not be empty".to_string()))
        );
    }
}
