//! Append-only error journal
//!
//! The journal is inert until [`ErrorJournal::start`] is called. The log
//! file is opened lazily, in append mode, on the first report after that,
//! and at most one file is held open per journal.

use crate::report::{Priority, Report, ReportSink};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Error sink that appends one line per report to a log file
pub struct ErrorJournal {
    /// Log file location
    path: PathBuf,
    /// Whether reports are written to disk
    started: AtomicBool,
    /// Reports below this priority are only mirrored to tracing
    min_priority: Priority,
    /// Lazily opened log file
    file: Mutex<Option<File>>,
}

impl ErrorJournal {
    /// Create an inert journal writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            started: AtomicBool::new(false),
            min_priority: Priority::Info,
            file: Mutex::new(None),
        }
    }

    /// Only persist reports at or above `priority`
    pub fn with_min_priority(mut self, priority: Priority) -> Self {
        self.min_priority = priority;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Begin persisting reports. Idempotent.
    pub fn start(&self) {
        if !self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!(path = %self.path.display(), "Error journal started");
        }
    }

    /// Stop persisting reports and close the log file
    pub fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
        if let Some(mut file) = self.file.lock().take() {
            if let Err(e) = file.flush() {
                tracing::warn!("Failed to flush error journal: {}", e);
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Whether the log file has been opened
    pub fn is_file_open(&self) -> bool {
        self.file.lock().is_some()
    }

    /// Append one report line, opening the log file if needed
    pub fn append(&self, report: &Report) -> Result<()> {
        let mut guard = self.file.lock();
        if guard.is_none() {
            *guard = Some(self.open_log()?);
        }

        if let Some(file) = guard.as_mut() {
            let mut line = report.line();
            line.push('\n');
            file.write_all(line.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }
        Ok(())
    }

    fn open_log(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create error journal directory")?;
            }
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open error journal {}", self.path.display()))
    }
}

impl ReportSink for ErrorJournal {
    fn report(&self, report: &Report) {
        let detail = report.detail.as_deref().unwrap_or("");
        match report.priority {
            Priority::Info => tracing::info!(code = report.code, detail, "{}", report.message),
            Priority::Warning => tracing::warn!(code = report.code, detail, "{}", report.message),
            Priority::Critical => tracing::error!(code = report.code, detail, "{}", report.message),
        }

        if !self.is_started() || report.priority < self.min_priority {
            return;
        }
        if let Err(e) = self.append(report) {
            tracing::warn!("Error journal unavailable: {:#}", e);
        }
    }
}

impl Drop for ErrorJournal {
    fn drop(&mut self) {
        if let Some(file) = self.file.get_mut().as_mut() {
            if let Err(e) = file.flush() {
                tracing::warn!("Failed to flush error journal: {}", e);
            }
        }
    }
}
