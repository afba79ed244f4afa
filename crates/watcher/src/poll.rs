//! Polling change detection
//!
//! Each registered path moves through `Unobserved -> Valid -> Invalid ->
//! Valid ...`. A change is reported when the last write time moves forward,
//! or when a path that was never seen (or had become unreachable) answers
//! again. Losing a path is reported once, on the transition into `Invalid`.

use crate::config::WatcherConfig;
use overseer_journal::{Report, ReportSink};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Message reported when a watched path stops answering
pub const LOST_PATH_MESSAGE: &str = "Cannot check the last write time";

/// Per-path watch record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchState {
    /// Last observed modification time; `None` until first observed
    pub last_write_time: Option<SystemTime>,
    /// Whether the last time query succeeded
    pub is_valid: bool,
    /// Force the next successful check to report a change
    pub needs_reload: bool,
}

impl WatchState {
    /// Never successfully queried
    pub fn is_unobserved(&self) -> bool {
        self.last_write_time.is_none()
    }
}

/// Tracks last write times for a set of paths
pub struct ChangeWatcher {
    states: HashMap<PathBuf, WatchState>,
    metadata_retries: u32,
    sink: Arc<dyn ReportSink>,
}

impl ChangeWatcher {
    /// Create a watcher with default retry bounds
    pub fn new(sink: Arc<dyn ReportSink>) -> Self {
        Self::with_config(sink, &WatcherConfig::default())
    }

    pub fn with_config(sink: Arc<dyn ReportSink>, config: &WatcherConfig) -> Self {
        Self {
            states: HashMap::new(),
            metadata_retries: config.metadata_retries.max(1),
            sink,
        }
    }

    /// Start tracking `path`. Returns false if it was already registered.
    pub fn register(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        if self.states.contains_key(&path) {
            return false;
        }
        self.states.insert(path, WatchState::default());
        true
    }

    pub fn unregister(&mut self, path: &Path) -> Option<WatchState> {
        self.states.remove(path)
    }

    pub fn state(&self, path: &Path) -> Option<&WatchState> {
        self.states.get(path)
    }

    pub fn is_valid(&self, path: &Path) -> bool {
        self.states.get(path).map_or(false, |s| s.is_valid)
    }

    pub fn last_write_time(&self, path: &Path) -> Option<SystemTime> {
        self.states.get(path).and_then(|s| s.last_write_time)
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.states.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Make the next successful [`ChangeWatcher::check`] on `path` report a
    /// change even if the write time did not move
    pub fn mark_stale(&mut self, path: &Path) {
        if let Some(state) = self.states.get_mut(path) {
            state.needs_reload = true;
        }
    }

    /// Poll `path` once. Unregistered paths are registered first.
    ///
    /// Returns true when the content should be re-read.
    pub fn check(&mut self, path: &Path) -> bool {
        if path.as_os_str().is_empty() {
            return false;
        }

        let queried = query_last_write_time(path, self.metadata_retries);
        let state = self.states.entry(path.to_path_buf()).or_default();

        match queried {
            Ok(time) => {
                let newer = state.last_write_time.map_or(false, |last| last < time);
                let reappeared = !state.is_valid && time != UNIX_EPOCH;
                if newer || reappeared || state.needs_reload {
                    state.last_write_time = Some(time);
                    state.is_valid = true;
                    state.needs_reload = false;
                    return true;
                }
                false
            }
            Err(e) => {
                if state.is_valid {
                    state.is_valid = false;
                    debug!(path = %path.display(), "Watched file became unreachable: {}", e);
                    self.sink.report(
                        &Report::info(e.raw_os_error().unwrap_or(0), LOST_PATH_MESSAGE)
                            .with_detail(path.display().to_string()),
                    );
                }
                false
            }
        }
    }

    /// Poll every registered path; returns the ones that changed
    pub fn check_all(&mut self) -> Vec<PathBuf> {
        let paths: Vec<PathBuf> = self.states.keys().cloned().collect();
        paths.into_iter().filter(|path| self.check(path)).collect()
    }
}

/// Query the modification time, retrying transient failures
fn query_last_write_time(path: &Path, attempts: u32) -> io::Result<SystemTime> {
    let mut last_error = None;
    for attempt in 1..=attempts.max(1) {
        match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(time) => return Ok(time),
            Err(e) => {
                if attempt < attempts {
                    debug!(attempt, path = %path.display(), "Retrying write time query: {}", e);
                }
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| io::Error::from(io::ErrorKind::Other)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use overseer_journal::{MemorySink, Priority};
    use std::time::Duration;
    use tempfile::TempDir;

    fn watcher() -> (ChangeWatcher, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (ChangeWatcher::new(sink.clone()), sink)
    }

    fn bump_mtime(path: &Path, seconds: u64) {
        let time = SystemTime::now() + Duration::from_secs(seconds);
        set_file_mtime(path, FileTime::from_system_time(time)).unwrap();
    }

    #[test]
    fn test_first_check_then_quiet() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"hello").unwrap();

        let (mut watcher, sink) = watcher();
        assert!(watcher.register(&path));
        assert!(!watcher.register(&path));
        assert!(watcher.state(&path).unwrap().is_unobserved());

        assert!(watcher.check(&path));
        assert!(watcher.is_valid(&path));
        assert!(!watcher.check(&path));
        assert!(!watcher.check(&path));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_newer_write_time_is_a_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"v1").unwrap();

        let (mut watcher, _sink) = watcher();
        assert!(watcher.check(&path));
        let first = watcher.last_write_time(&path).unwrap();

        bump_mtime(&path, 10);
        assert!(watcher.check(&path));
        assert!(watcher.last_write_time(&path).unwrap() > first);
        assert!(!watcher.check(&path));
    }

    #[test]
    fn test_older_write_time_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"v1").unwrap();
        bump_mtime(&path, 100);

        let (mut watcher, _sink) = watcher();
        assert!(watcher.check(&path));

        let past = SystemTime::now() - Duration::from_secs(100);
        set_file_mtime(&path, FileTime::from_system_time(past)).unwrap();
        assert!(!watcher.check(&path));
    }

    #[test]
    fn test_lost_path_reported_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");
        fs::write(&path, b"data").unwrap();

        let (mut watcher, sink) = watcher();
        assert!(watcher.check(&path));

        fs::remove_file(&path).unwrap();
        assert!(!watcher.check(&path));
        assert!(!watcher.is_valid(&path));
        assert!(!watcher.check(&path));
        assert!(!watcher.check(&path));

        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].priority, Priority::Info);
        assert_eq!(reports[0].message, LOST_PATH_MESSAGE);
        assert_eq!(reports[0].code, 2);
        assert_eq!(reports[0].detail.as_deref(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_reappearing_file_is_a_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("output.txt");
        fs::write(&path, b"data").unwrap();

        let (mut watcher, sink) = watcher();
        assert!(watcher.check(&path));
        let before = watcher.last_write_time(&path).unwrap();

        fs::remove_file(&path).unwrap();
        assert!(!watcher.check(&path));

        // Recreated with an older timestamp: still a change
        fs::write(&path, b"again").unwrap();
        let older = before - Duration::from_secs(60);
        set_file_mtime(&path, FileTime::from_system_time(older)).unwrap();
        assert!(watcher.check(&path));
        assert!(watcher.is_valid(&path));
        assert!(!watcher.check(&path));

        // Losing it again reports again
        fs::remove_file(&path).unwrap();
        assert!(!watcher.check(&path));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_missing_from_start_is_silent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("never.txt");

        let (mut watcher, sink) = watcher();
        assert!(!watcher.check(&path));
        assert!(!watcher.check(&path));
        assert!(sink.is_empty());
        assert_eq!(watcher.len(), 1);

        fs::write(&path, b"now").unwrap();
        assert!(watcher.check(&path));
    }

    #[test]
    fn test_epoch_time_is_not_a_reappearance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"old").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(0, 0)).unwrap();

        let (mut watcher, _sink) = watcher();
        assert!(!watcher.check(&path));

        bump_mtime(&path, 0);
        assert!(watcher.check(&path));
    }

    #[test]
    fn test_mark_stale_forces_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        fs::write(&path, b"x").unwrap();

        let (mut watcher, _sink) = watcher();
        assert!(watcher.check(&path));
        watcher.mark_stale(&path);
        assert!(watcher.check(&path));
        assert!(!watcher.check(&path));
    }

    #[test]
    fn test_empty_path_never_changes() {
        let (mut watcher, _sink) = watcher();
        assert!(!watcher.check(Path::new("")));
        assert!(watcher.is_empty());
    }

    #[test]
    fn test_check_all() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let (mut watcher, _sink) = watcher();
        watcher.register(&a);
        watcher.register(&b);

        let mut changed = watcher.check_all();
        changed.sort();
        assert_eq!(changed, vec![a.clone(), b.clone()]);
        assert!(watcher.check_all().is_empty());

        bump_mtime(&b, 5);
        assert_eq!(watcher.check_all(), vec![b]);

        assert!(watcher.unregister(&a).is_some());
        assert_eq!(watcher.paths().count(), 1);
    }
}
