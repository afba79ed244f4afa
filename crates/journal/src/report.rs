//! Report model and sinks

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Severity of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Info => "Info",
            Priority::Warning => "Warning",
            Priority::Critical => "Critical",
        })
    }
}

/// A single reported failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub priority: Priority,
    /// OS error code, or 0 when there is none
    pub code: i32,
    pub message: String,
    /// Usually the path the failure concerns
    pub detail: Option<String>,
}

impl Report {
    pub fn new(priority: Priority, code: i32, message: impl Into<String>) -> Self {
        Self {
            priority,
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn info(code: i32, message: impl Into<String>) -> Self {
        Self::new(Priority::Info, code, message)
    }

    pub fn warning(code: i32, message: impl Into<String>) -> Self {
        Self::new(Priority::Warning, code, message)
    }

    pub fn critical(code: i32, message: impl Into<String>) -> Self {
        Self::new(Priority::Critical, code, message)
    }

    /// Attach a path or other detail
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Log line: `[<Priority>] <message> (<code>): <detail>`
    pub fn line(&self) -> String {
        match &self.detail {
            Some(detail) => format!(
                "[{}] {} ({}): {}",
                self.priority, self.message, self.code, detail
            ),
            None => format!("[{}] {} ({})", self.priority, self.message, self.code),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line())
    }
}

/// Destination for reports
///
/// Implementations must not block for long: reports are emitted from the
/// watcher tick.
pub trait ReportSink: Send + Sync {
    fn report(&self, report: &Report);
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn report(&self, report: &Report) {
        (**self).report(report)
    }
}

/// Sink that drops every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn report(&self, _report: &Report) {}
}

/// Sink that keeps reports in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// Number of reports with the given priority
    pub fn count(&self, priority: Priority) -> usize {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.priority == priority)
            .count()
    }

    /// Drain all reports
    pub fn take(&self) -> Vec<Report> {
        std::mem::take(&mut *self.reports.lock())
    }
}

impl ReportSink for MemorySink {
    fn report(&self, report: &Report) {
        self.reports.lock().push(report.clone());
    }
}
