use log::info;
use xlifflint::{FixOptions, fix_file};

use crate::report::{BatchSummary, FileEntry, JsonReport, OutputMode, format_file_report};

/// Check (and optionally fix) `files` one after another and print the report.
///
/// Stops early once `max_error_files` files produced diagnostics. Returns the
/// aggregate counters; the caller turns them into the exit code.
pub fn run_batch(
    files: &[String],
    options: &FixOptions,
    max_error_files: Option<usize>,
    mode: OutputMode,
) -> BatchSummary {
    let mut summary = BatchSummary::new(files.len());
    let mut entries: Vec<FileEntry> = Vec::new();

    for file in files {
        if summary.limit_reached(max_error_files) {
            info!(
                "stopping after {} files with errors, {} files left unchecked",
                summary.error_files,
                summary.total - summary.checked
            );
            summary.stopped_early = true;
            break;
        }

        let report = fix_file(file, options);
        summary.record(&report);
        if report.was_written() {
            info!("{}: fixed", file);
        }

        match mode {
            OutputMode::Human => print!("{}", format_file_report(&report)),
            OutputMode::Json => entries.push(FileEntry::from(&report)),
        }
    }

    match mode {
        OutputMode::Human => println!("{}", summary.summary_line()),
        OutputMode::Json => {
            let report = JsonReport {
                files: entries,
                summary: summary.clone(),
            };
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error serializing to JSON: {}", e),
            }
        }
    }

    summary
}
