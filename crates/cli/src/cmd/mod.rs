//! CLI command implementations

pub mod cat;
pub mod config;
pub mod encodings;
pub mod scan;
pub mod watch;
pub mod write;

use anyhow::{Context as _, Result};
use overseer_cli::util;
use overseer_cli::OverseerConfig;
use overseer_journal::{ErrorJournal, NullSink, Report, ReportSink};
use overseer_watcher::{FilePathError, Language, PeriodNames};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Message recorded for paths a scan could not inspect
pub const SCAN_FAILED_MESSAGE: &str = "Cannot inspect the path while scanning";

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub language: Option<Language>,
}

/// Resolved configuration, root and report sink for one invocation
pub struct Context {
    pub root: PathBuf,
    pub config: OverseerConfig,
    pub config_source: Option<PathBuf>,
    pub language: Language,
    journal: Option<Arc<ErrorJournal>>,
}

impl Context {
    /// Load configuration for `root_arg` (or the current directory) and
    /// start the error journal when enabled
    pub fn load(options: &GlobalOptions, root_arg: Option<&Path>) -> Result<Self> {
        let start = match root_arg {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().context("Failed to get current directory")?,
        };
        let (config, config_source) = OverseerConfig::discover(options.config.as_deref(), &start)?;
        let root = util::resolve_root(root_arg, config.root.as_deref())?;

        let journal = if config.journal.enabled {
            let base = options.log_dir.as_deref().unwrap_or(&root);
            let journal = ErrorJournal::new(config.journal_path(base))
                .with_min_priority(config.journal.min_priority);
            journal.start();
            Some(Arc::new(journal))
        } else {
            None
        };

        Ok(Self {
            language: options.language.unwrap_or(config.language),
            root,
            config,
            config_source,
            journal,
        })
    }

    /// Where reports go for this invocation
    pub fn sink(&self) -> Arc<dyn ReportSink> {
        match &self.journal {
            Some(journal) => Arc::clone(journal) as Arc<dyn ReportSink>,
            None => Arc::new(NullSink),
        }
    }

    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_deref().map(ErrorJournal::path)
    }

    pub fn names(&self) -> &'static PeriodNames {
        self.language.names()
    }

    /// Record scan failures as warnings
    pub fn report_scan_errors(&self, errors: &[FilePathError]) {
        let sink = self.sink();
        for error in errors {
            sink.report(
                &Report::warning(error.code, SCAN_FAILED_MESSAGE)
                    .with_detail(error.path.display().to_string()),
            );
        }
    }
}

/// Parse `--language`
pub fn parse_language(value: &str) -> Result<Language, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "en" | "english" => Ok(Language::English),
        "ko" | "kr" | "korean" => Ok(Language::Korean),
        other => Err(format!("unknown language '{}' (expected english or korean)", other)),
    }
}
