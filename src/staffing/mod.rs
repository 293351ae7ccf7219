pub mod aggregate;
pub mod extract;
pub mod report;
pub mod schema;
pub mod shift;
pub mod split;
pub mod summarize_hours;
pub mod workbook;
