//! Report formatting for human and JSON modes, plus the batch counters.

use serde::Serialize;
use xlifflint::{FileOutcome, FixReport};

/// Name used in the summary line.
pub const TOOL_NAME: &str = "xlifflint";

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Aggregate counters of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Files given on the command line (after glob expansion)
    pub total: usize,
    /// Files actually processed
    pub checked: usize,
    /// Diagnostics over all files
    pub errors: usize,
    /// Files with at least one diagnostic
    pub error_files: usize,
    /// Files that could not be processed (missing, unparsable, write failed)
    pub failed_files: usize,
    /// Files that were rewritten
    pub written: usize,
    /// Whether the error-file limit ended the run early
    pub stopped_early: bool,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: &FixReport) {
        self.checked += 1;
        if !report.is_empty() {
            self.errors += report.len();
            self.error_files += 1;
        }
        if report.outcome() == FileOutcome::Error {
            self.failed_files += 1;
        }
        if report.was_written() {
            self.written += 1;
        }
    }

    /// Whether `limit` files with errors have been seen.
    pub fn limit_reached(&self, limit: Option<usize>) -> bool {
        limit.is_some_and(|limit| self.error_files >= limit)
    }

    pub fn exit_code(&self) -> i32 {
        if self.errors > 0 { 1 } else { 0 }
    }

    pub fn summary_line(&self) -> String {
        if self.errors > 0 {
            format!(
                "{}: {} Errors in {} files (checked {} of {})",
                TOOL_NAME, self.errors, self.error_files, self.checked, self.total
            )
        } else {
            format!("{}: [OK] checked {} files", TOOL_NAME, self.total)
        }
    }
}

/// Human-readable block for one file: a status line and one line per diagnostic.
pub fn format_file_report(report: &FixReport) -> String {
    let file = report.path().display();
    if report.is_empty() {
        return format!("{} [OK]\n", file);
    }
    let mut out = format!("{} {} ERRORS\n", file, report.len());
    for message in report.messages() {
        out.push_str(&format!(" * {}\n", message));
    }
    out
}

/// One file in the JSON report
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub file: String,
    pub outcome: String,
    pub written: bool,
    pub diagnostics: Vec<String>,
}

impl From<&FixReport> for FileEntry {
    fn from(report: &FixReport) -> Self {
        Self {
            file: report.path().display().to_string(),
            outcome: report.outcome().to_string(),
            written: report.was_written(),
            diagnostics: report.messages(),
        }
    }
}

/// Complete JSON report of a batch run
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub files: Vec<FileEntry>,
    pub summary: BatchSummary,
}
