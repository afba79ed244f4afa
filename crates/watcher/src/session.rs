//! Watched file: re-read on change, write with restore-on-failure
//!
//! Every operation that touches the file handle takes its lock with
//! `try_lock`. A busy lock is a "not this time" outcome, never a wait.

use crate::config::WatcherConfig;
use crate::elapsed::{format_since, Period, PeriodNames};
use crate::error::WatchError;
use crate::poll::ChangeWatcher;
use crate::text::TextCodec;
use overseer_core::{Encoding, OpenMode, TextFile, TextFileError};
use overseer_journal::{Report, ReportSink};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

pub const READ_FAILED_MESSAGE: &str = "Cannot open the file to read";
pub const CONVERSION_FAILED_MESSAGE: &str =
    "Encoding conversion failed when writing the file (UTF-8 to ANSI)";
pub const WRITE_FAILED_MESSAGE: &str = "Cannot write the file";
pub const RESTORE_FAILED_MESSAGE: &str = "Cannot restore the file as UTF-8";

/// Last successfully read content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub encoding: Encoding,
    /// Raw post-BOM bytes as read from disk
    pub bytes: Vec<u8>,
}

/// Result of one read attempt
#[derive(Debug)]
pub enum ReadOutcome {
    Read,
    /// The handle was held elsewhere
    Busy,
    Failed(TextFileError),
}

/// Result of one tick for a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Unchanged,
    Reloaded,
    /// Changed, but every read attempt failed or found the handle busy
    ReadFailed,
    /// The write time cannot be queried
    Missing,
}

/// Result of a write request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The handle was held elsewhere; nothing was written
    Busy,
}

/// One file under watch, owning its [`TextFile`] handle
pub struct WatchedFile {
    path: PathBuf,
    handle: Mutex<TextFile>,
    codec: TextCodec,
    read_retries: u32,
    sink: Arc<dyn ReportSink>,
    snapshot: RwLock<Option<Snapshot>>,
    /// UTF-8 copy of the last read or edited text
    backup: RwLock<String>,
    read_failed: AtomicBool,
}

impl WatchedFile {
    pub fn new(
        path: impl Into<PathBuf>,
        config: &WatcherConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, WatchError> {
        let path = path.into();
        let mut handle = TextFile::new(&path);
        handle.set_utf8_policy(config.utf8_policy());

        Ok(Self {
            path,
            handle: Mutex::new(handle),
            codec: config.codec()?,
            read_retries: config.read_retries.max(1),
            sink,
            snapshot: RwLock::new(None),
            backup: RwLock::new(String::new()),
            read_failed: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last successfully read content
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot.read().clone()
    }

    /// Text of the last snapshot, or empty
    pub fn text(&self) -> String {
        self.snapshot
            .read()
            .as_ref()
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }

    pub fn backup(&self) -> String {
        self.backup.read().clone()
    }

    /// Current encoding, or `None` when the handle is busy
    pub fn encoding(&self) -> Option<Encoding> {
        self.handle.try_lock().map(|handle| handle.encoding())
    }

    /// Choose the encoding for subsequent writes. Returns false when busy.
    pub fn set_encoding(&self, encoding: Encoding) -> bool {
        match self.handle.try_lock() {
            Some(mut handle) => {
                handle.set_encoding(encoding);
                true
            }
            None => false,
        }
    }

    /// Take the handle lock without waiting
    pub fn try_lock(&self) -> Option<MutexGuard<'_, TextFile>> {
        self.handle.try_lock()
    }

    /// Read the file once and publish a new snapshot
    pub fn read(&self) -> ReadOutcome {
        let Some(mut handle) = self.handle.try_lock() else {
            debug!(path = %self.path.display(), "Read skipped, handle busy");
            return ReadOutcome::Busy;
        };

        let (bytes, encoding) = match read_locked(&mut handle) {
            Ok(read) => read,
            Err(e) => return ReadOutcome::Failed(e),
        };

        // Published while the handle is still held so a concurrent write
        // cannot be overwritten by older content
        let text = self.codec.decode(&bytes, encoding);
        *self.backup.write() = text.clone();
        *self.snapshot.write() = Some(Snapshot {
            text,
            encoding,
            bytes,
        });
        self.read_failed.store(false, Ordering::Relaxed);
        ReadOutcome::Read
    }

    /// Poll the watcher and re-read on change.
    ///
    /// Up to `read_retries` attempts are made. When none succeeds the path
    /// is marked stale so the next tick tries again.
    pub fn refresh(&self, watcher: &mut ChangeWatcher) -> Refresh {
        if !watcher.check(&self.path) {
            return if watcher.is_valid(&self.path) {
                Refresh::Unchanged
            } else {
                Refresh::Missing
            };
        }

        let mut failure = None;
        for attempt in 1..=self.read_retries {
            match self.read() {
                ReadOutcome::Read => {
                    debug!(path = %self.path.display(), attempt, "Reloaded");
                    return Refresh::Reloaded;
                }
                ReadOutcome::Busy => {}
                ReadOutcome::Failed(e) => failure = Some(e),
            }
        }

        watcher.mark_stale(&self.path);
        if let Some(e) = failure {
            if !self.read_failed.swap(true, Ordering::Relaxed) {
                self.sink.report(
                    &Report::info(e.os_code(), READ_FAILED_MESSAGE)
                        .with_detail(self.path.display().to_string()),
                );
            }
        }
        Refresh::ReadFailed
    }

    /// Replace the file content with `text` in the current encoding.
    ///
    /// If the text cannot be encoded or written, a critical report is
    /// emitted, the text is written back as UTF-8 with a BOM and the handle
    /// switches to `Utf8`. The original error is returned.
    pub fn write_text(&self, text: &str) -> Result<WriteOutcome, WatchError> {
        let Some(mut handle) = self.handle.try_lock() else {
            debug!(path = %self.path.display(), "Write skipped, handle busy");
            return Ok(WriteOutcome::Busy);
        };
        *self.backup.write() = text.to_string();

        let encoding = handle.encoding();
        let result = self
            .codec
            .encode(text, encoding)
            .and_then(|bytes| write_locked(&mut handle, &bytes));

        match result {
            Ok(()) => {
                debug!(path = %self.path.display(), %encoding, "Wrote file");
                Ok(WriteOutcome::Written)
            }
            Err(e) => {
                let message = match e {
                    TextFileError::Unmappable { .. } => CONVERSION_FAILED_MESSAGE,
                    _ => WRITE_FAILED_MESSAGE,
                };
                self.sink.report(
                    &Report::critical(e.os_code(), message)
                        .with_detail(self.path.display().to_string()),
                );
                self.restore_as_utf8(&mut handle);
                Err(e.into())
            }
        }
    }

    /// Write the backup text as UTF-8; used after a failed write
    fn restore_as_utf8(&self, handle: &mut TextFile) {
        let backup = self.backup.read().clone();
        handle.close();
        handle.set_encoding(Encoding::Utf8);

        match write_locked(handle, backup.as_bytes()) {
            Ok(()) => info!(path = %self.path.display(), "Restored file content as UTF-8"),
            Err(e) => self.sink.report(
                &Report::critical(e.os_code(), RESTORE_FAILED_MESSAGE)
                    .with_detail(self.path.display().to_string()),
            ),
        }
    }

    /// Status text: time since the last write, or why there is none
    pub fn status_line(&self, watcher: &ChangeWatcher, now: SystemTime, names: &PeriodNames) -> String {
        match watcher.state(&self.path) {
            Some(state) if state.is_valid => {
                if self.read_failed.load(Ordering::Relaxed) {
                    return names.unreadable.to_string();
                }
                match state.last_write_time {
                    Some(time) => format_since(time, now, Period::Second, false, names),
                    None => names.not_found.to_string(),
                }
            }
            _ => names.not_found.to_string(),
        }
    }
}

fn read_locked(handle: &mut TextFile) -> Result<(Vec<u8>, Encoding), TextFileError> {
    let mut session = handle.session(OpenMode::Read)?;
    let bytes = session.read_all()?;
    Ok((bytes, session.encoding()))
}

fn write_locked(handle: &mut TextFile, bytes: &[u8]) -> Result<(), TextFileError> {
    let mut session = handle.session(OpenMode::Write)?;
    session.write_all(bytes)?;
    session.flush()
}
