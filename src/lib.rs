//! Hourly staffing summary for timesheet exports.
//!
//! Reads the "all employees" sheet of a timesheet export, spreads every shift
//! over the clock hours it covers and totals the staffed hours per day and
//! hour into a report workbook.

pub mod error;
pub mod notify;
pub mod staffing;
