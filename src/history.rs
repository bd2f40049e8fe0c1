//! Per-page and per-job result records, and the batch history they roll up
//! into.
//!
//! The library never writes a log file or touches a display: it hands the
//! caller a [`BatchHistory`] and lets the external logging or UI layer decide
//! what to persist. [`BatchHistory::export`] produces a ready-made textual
//! report for callers that just want something printable.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of a single page within a job.
///
/// A page succeeded iff `error` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Zero-based page index in the source document.
    pub index: usize,
    /// The failure, if the page failed to render or transform.
    pub error: Option<PageError>,
}

impl PageResult {
    pub fn ok(index: usize) -> Self {
        Self { index, error: None }
    }

    pub fn failed(index: usize, error: PageError) -> Self {
        Self {
            index,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Terminal status of one conversion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Every selected page converted and the output was written.
    Success,
    /// Output was written but at least one page failed.
    PartialFailure,
    /// No output: the document could not be opened, the range was invalid,
    /// no pages survived, or the output could not be written.
    Failed,
    /// Output path existed and the overwrite policy declined; nothing was
    /// rendered.
    Skipped,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Success => "success",
            JobStatus::PartialFailure => "partial",
            JobStatus::Failed => "failed",
            JobStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Outcome of one conversion job (one input file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// Input file path.
    pub source: PathBuf,
    /// Resolved output path. `None` when the job failed before resolution.
    pub output: Option<PathBuf>,
    /// Per-page outcomes in selection order. Empty for skipped jobs and jobs
    /// that failed before rendering.
    pub pages: Vec<PageResult>,
    /// Terminal status.
    pub status: JobStatus,
    /// Wall-clock duration of the job in milliseconds.
    pub elapsed_ms: u64,
    /// Size of the written output file in bytes; 0 when nothing was written.
    pub output_bytes: u64,
    /// Human-readable reason for `Failed` and `Skipped` statuses.
    pub reason: Option<String>,
}

impl JobResult {
    /// Number of pages that converted successfully.
    pub fn pages_ok(&self) -> usize {
        self.pages.iter().filter(|p| p.is_ok()).count()
    }

    /// Number of pages that failed.
    pub fn pages_failed(&self) -> usize {
        self.pages.len() - self.pages_ok()
    }

    fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Report format accepted by [`BatchHistory::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Aligned, human-readable table plus per-page failure details.
    Text,
    /// One CSV row per job; per-page failures joined with `;`.
    Csv,
}

/// Append-only record of every job a batch has completed, in completion
/// order (== input order, since jobs run sequentially).
///
/// Owned exclusively by the batch controller while the batch runs, then
/// handed to the caller. Process-lifetime scoped: nothing is persisted unless
/// the caller exports and stores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchHistory {
    entries: Vec<JobResult>,
}

impl BatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: JobResult) {
        self.entries.push(result);
    }

    pub fn entries(&self) -> &[JobResult] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of jobs with the given status.
    pub fn count(&self, status: JobStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }

    /// Serialise the history to a textual report.
    pub fn export(&self, format: ExportFormat) -> String {
        match format {
            ExportFormat::Text => self.export_text(),
            ExportFormat::Csv => self.export_csv(),
        }
    }

    fn export_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<40} {:<8} {:>9} {:>9} {:>11}\n",
            "file", "status", "pages", "elapsed", "size"
        ));
        for entry in &self.entries {
            out.push_str(&format!(
                "{:<40} {:<8} {:>4}/{:<4} {:>8}ms {:>10}B\n",
                entry.file_name(),
                entry.status,
                entry.pages_ok(),
                entry.pages.len(),
                entry.elapsed_ms,
                entry.output_bytes,
            ));
            if let Some(ref reason) = entry.reason {
                out.push_str(&format!("    reason: {reason}\n"));
            }
            for page in entry.pages.iter().filter(|p| !p.is_ok()) {
                if let Some(ref e) = page.error {
                    out.push_str(&format!("    {e}\n"));
                }
            }
        }
        out
    }

    fn export_csv(&self) -> String {
        let mut out =
            String::from("source,output,status,pages_ok,pages_total,elapsed_ms,output_bytes,failures\n");
        for entry in &self.entries {
            let failures = entry
                .pages
                .iter()
                .filter_map(|p| p.error.as_ref().map(|e| e.to_string()))
                .collect::<Vec<_>>()
                .join(";");
            out.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                csv_field(&entry.source.display().to_string()),
                csv_field(
                    &entry
                        .output
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                ),
                entry.status,
                entry.pages_ok(),
                entry.pages.len(),
                entry.elapsed_ms,
                entry.output_bytes,
                csv_field(&failures),
            ));
        }
        out
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;

    fn sample_history() -> BatchHistory {
        let mut history = BatchHistory::new();
        history.push(JobResult {
            source: "a.pdf".into(),
            output: Some("a_SW.pdf".into()),
            pages: vec![PageResult::ok(0), PageResult::ok(1)],
            status: JobStatus::Success,
            elapsed_ms: 120,
            output_bytes: 4096,
            reason: None,
        });
        history.push(JobResult {
            source: "b.pdf".into(),
            output: Some("b_SW.pdf".into()),
            pages: vec![
                PageResult::ok(0),
                PageResult::failed(
                    1,
                    PageError::RenderFailed {
                        page: 2,
                        detail: "boom".into(),
                    },
                ),
            ],
            status: JobStatus::PartialFailure,
            elapsed_ms: 80,
            output_bytes: 2048,
            reason: None,
        });
        history
    }

    #[test]
    fn counts_by_status() {
        let history = sample_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.count(JobStatus::Success), 1);
        assert_eq!(history.count(JobStatus::PartialFailure), 1);
        assert_eq!(history.count(JobStatus::Failed), 0);
    }

    #[test]
    fn text_export_lists_page_failures() {
        let report = sample_history().export(ExportFormat::Text);
        assert!(report.contains("a.pdf"));
        assert!(report.contains("partial"));
        assert!(report.contains("Page 2"), "got:\n{report}");
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let report = sample_history().export(ExportFormat::Csv);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("source,output,status"));
        assert!(lines[1].contains("success"));
        assert!(lines[2].contains("partial"));
        assert!(lines[2].contains("boom"));
    }

    #[test]
    fn csv_quotes_fields_with_commas() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn job_result_page_counts() {
        let history = sample_history();
        let partial = &history.entries()[1];
        assert_eq!(partial.pages_ok(), 1);
        assert_eq!(partial.pages_failed(), 1);
    }

    #[test]
    fn history_serialises_to_json() {
        let json = serde_json::to_string(&sample_history()).unwrap();
        let back: BatchHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
    }
}
