//! Watched input/output pairs driven by a periodic tick

use crate::config::WatcherConfig;
use crate::error::WatchError;
use crate::poll::ChangeWatcher;
use crate::scan::FilePair;
use crate::session::{Refresh, WatchedFile};
use overseer_journal::ReportSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Both sides of one discovered pair
pub struct WatchedPair {
    pub pair: FilePair,
    pub input: Option<WatchedFile>,
    pub output: Option<WatchedFile>,
}

impl WatchedPair {
    /// Directory the pair lives in
    pub fn directory(&self) -> Option<&Path> {
        self.pair.directory()
    }

    pub fn files(&self) -> impl Iterator<Item = &WatchedFile> {
        self.input.iter().chain(self.output.iter())
    }
}

/// Something a tick observed for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickEvent {
    pub path: PathBuf,
    pub refresh: Refresh,
}

/// All watched pairs plus the change watcher that polls them
pub struct WatchSet {
    watcher: ChangeWatcher,
    pairs: Vec<WatchedPair>,
    config: WatcherConfig,
    sink: Arc<dyn ReportSink>,
}

impl WatchSet {
    pub fn new(config: WatcherConfig, sink: Arc<dyn ReportSink>) -> Result<Self, WatchError> {
        config.validate()?;
        Ok(Self {
            watcher: ChangeWatcher::with_config(sink.clone(), &config),
            pairs: Vec::new(),
            config,
            sink,
        })
    }

    /// Build a set from located pairs
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = FilePair>,
        config: WatcherConfig,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, WatchError> {
        let mut set = Self::new(config, sink)?;
        for pair in pairs {
            set.add_pair(pair)?;
        }
        Ok(set)
    }

    /// Register both sides of `pair` with the watcher
    pub fn add_pair(&mut self, pair: FilePair) -> Result<(), WatchError> {
        let input = self.watch(pair.input.as_deref())?;
        let output = self.watch(pair.output.as_deref())?;
        self.pairs.push(WatchedPair {
            pair,
            input,
            output,
        });
        Ok(())
    }

    fn watch(&mut self, path: Option<&Path>) -> Result<Option<WatchedFile>, WatchError> {
        let Some(path) = path else {
            return Ok(None);
        };
        self.watcher.register(path);
        Ok(Some(WatchedFile::new(path, &self.config, self.sink.clone())?))
    }

    pub fn pairs(&self) -> &[WatchedPair] {
        &self.pairs
    }

    pub fn watcher(&self) -> &ChangeWatcher {
        &self.watcher
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Refresh every file once, in pair order.
    ///
    /// Returns the files that reloaded or failed to reload.
    pub fn tick(&mut self) -> Vec<TickEvent> {
        let mut events = Vec::new();
        for pair in &self.pairs {
            for file in pair.files() {
                let refresh = file.refresh(&mut self.watcher);
                if matches!(refresh, Refresh::Reloaded | Refresh::ReadFailed) {
                    events.push(TickEvent {
                        path: file.path().to_path_buf(),
                        refresh,
                    });
                }
            }
        }
        if !events.is_empty() {
            debug!(events = events.len(), "Tick observed changes");
        }
        events
    }
}
