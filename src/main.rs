use hourly_staffing::notify::{failure_message, ConsoleNotifier, Notifier};
use hourly_staffing::staffing::{schema::InputSchema, summarize_hours::run};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Error;
use clap::{error::ErrorKind, CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "hourly-staffing",
    version,
    about = "Total staffed hours per day and clock hour from a timesheet export"
)]
struct Cli {
    /// Timesheet export (xlsx); prompts for it when dialogs are enabled
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// JSON file overriding sheet name, header row, column names and report prefix
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Report path (default: next to the input, prefixed)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write the totals as JSON
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Report the outcome on the console instead of a dialog
    #[arg(long)]
    no_dialog: bool,

    /// Verbose tracing on stderr
    #[arg(long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg_attr(not(feature = "dialogs"), allow(unused_variables))]
fn notifier(no_dialog: bool) -> Box<dyn Notifier> {
    #[cfg(feature = "dialogs")]
    {
        if !no_dialog {
            return Box::new(hourly_staffing::notify::DialogNotifier);
        }
    }
    Box::new(ConsoleNotifier)
}

fn input_path(args: &Cli) -> Option<PathBuf> {
    if let Some(input) = &args.input {
        return Some(input.clone());
    }

    #[cfg(feature = "dialogs")]
    {
        if !args.no_dialog {
            return hourly_staffing::notify::pick_input_file();
        }
    }

    Cli::command()
        .error(ErrorKind::MissingRequiredArgument, "no timesheet export given")
        .exit()
}

fn run_cli(args: &Cli, input: &Path) -> Result<PathBuf, Error> {
    let schema = match &args.schema {
        Some(path) => InputSchema::from_json_file(path)?,
        None => InputSchema::default(),
    };

    run(input, args.output.as_deref(), args.json.as_deref(), &schema)
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.debug);

    // A cancelled file prompt ends the run quietly.
    let Some(input) = input_path(&args) else {
        return ExitCode::SUCCESS;
    };

    let notifier = notifier(args.no_dialog);
    match run_cli(&args, &input) {
        Ok(output) => {
            notifier.notify_success(&output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(input = %input.display(), "run failed: {err:#}");
            notifier.notify_failure(&failure_message(&err));
            ExitCode::FAILURE
        }
    }
}
