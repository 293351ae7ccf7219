use crate::error::StaffingError;
use std::path::Path;

use anyhow::Error;

/// Tells the user how a run ended.
pub trait Notifier {
    fn notify_success(&self, output: &Path);
    fn notify_failure(&self, message: &str);
}

pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, output: &Path) {
        println!("Report saved: {}", output.display());
    }

    fn notify_failure(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}

#[cfg(feature = "dialogs")]
pub struct DialogNotifier;

#[cfg(feature = "dialogs")]
impl Notifier for DialogNotifier {
    fn notify_success(&self, output: &Path) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Info)
            .set_title("Done")
            .set_description(format!("Report saved: {}", output.display()))
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }

    fn notify_failure(&self, message: &str) {
        rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Error)
            .set_title("Error")
            .set_description(message)
            .set_buttons(rfd::MessageButtons::Ok)
            .show();
    }
}

/// Asks for the timesheet export; `None` when the prompt was cancelled.
#[cfg(feature = "dialogs")]
pub fn pick_input_file() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select timesheet export")
        .add_filter("Excel files", &["xlsx", "xlsm", "xls"])
        .pick_file()
}

/// Human-readable cause of a failed run.
pub fn failure_message(err: &Error) -> String {
    match err.downcast_ref::<StaffingError>() {
        Some(staffing_error) => staffing_error.to_string(),
        None => format!("Unexpected error while processing the export: {err:#}"),
    }
}
