//! Overseer configuration (`overseer.toml`)
//!
//! Lookup order: `--config PATH`, then `<root>/overseer.toml`, then
//! `<config dir>/overseer/config.toml`. Missing files fall back to defaults.

use anyhow::{Context, Result};
use overseer_journal::Priority;
use overseer_watcher::config::{
    DEFAULT_METADATA_RETRIES, DEFAULT_READ_RETRIES, DEFAULT_SYSTEM_CODE_PAGE,
};
use overseer_watcher::scan::{DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME};
use overseer_watcher::{Language, WatcherConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the watched root
pub const LOCAL_CONFIG_NAME: &str = "overseer.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverseerConfig {
    /// Input file name searched in every directory (default: input.txt)
    #[serde(default = "default_input_name")]
    pub input_name: String,

    /// Output file name searched in every directory (default: output.txt)
    #[serde(default = "default_output_name")]
    pub output_name: String,

    /// Root to scan when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Fill in the missing side of a pair (default: true)
    #[serde(default = "default_true")]
    pub synthesize_missing: bool,

    /// Status text language
    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub watch: WatchSettings,

    #[serde(default)]
    pub encoding: EncodingSettings,

    #[serde(default)]
    pub journal: JournalSettings,
}

/// `[watch]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSettings {
    /// Poll cadence in milliseconds (default: 100, range 10-60000)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Attempts per last-write-time query (default: 5)
    #[serde(default = "default_metadata_retries")]
    pub metadata_retries: u32,

    /// Read attempts after a change (default: 3)
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,
}

/// `[encoding]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Code page for ANSI content
    #[serde(default = "default_system_code_page")]
    pub system_code_page: String,

    /// Classify BOM-less UTF-8 content
    #[serde(default = "default_true")]
    pub detect_utf8_without_bom: bool,
}

/// `[journal]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSettings {
    /// Write reports to the error log (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log file; relative paths resolve against the log directory
    #[serde(default = "default_journal_file")]
    pub file: PathBuf,

    /// Lowest priority written to the log
    #[serde(default = "default_min_priority")]
    pub min_priority: Priority,
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            input_name: default_input_name(),
            output_name: default_output_name(),
            root: None,
            synthesize_missing: true,
            language: Language::default(),
            watch: WatchSettings::default(),
            encoding: EncodingSettings::default(),
            journal: JournalSettings::default(),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            metadata_retries: DEFAULT_METADATA_RETRIES,
            read_retries: DEFAULT_READ_RETRIES,
        }
    }
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            system_code_page: default_system_code_page(),
            detect_utf8_without_bom: true,
        }
    }
}

impl Default for JournalSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            file: default_journal_file(),
            min_priority: default_min_priority(),
        }
    }
}

impl OverseerConfig {
    /// Parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Find and load the configuration for `root`.
    ///
    /// Returns the config and the file it came from, if any.
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates = [
            Some(root.join(LOCAL_CONFIG_NAME)),
            user_config_path(),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Loading configuration");
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    /// Check names, ranges and the code page
    pub fn validate(&self) -> Result<()> {
        if self.input_name.trim().is_empty() || self.output_name.trim().is_empty() {
            anyhow::bail!("input_name and output_name must not be empty");
        }
        if self.input_name == self.output_name {
            anyhow::bail!("input_name and output_name must differ");
        }
        if !(10..=60_000).contains(&self.watch.tick_interval_ms) {
            anyhow::bail!(
                "watch.tick_interval_ms must be between 10 and 60000, got {}",
                self.watch.tick_interval_ms
            );
        }
        self.watcher_config().validate()?;
        Ok(())
    }

    /// Settings for the watcher crate
    pub fn watcher_config(&self) -> WatcherConfig {
        WatcherConfig {
            metadata_retries: self.watch.metadata_retries,
            read_retries: self.watch.read_retries,
            detect_utf8_without_bom: self.encoding.detect_utf8_without_bom,
            system_code_page: self.encoding.system_code_page.clone(),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.watch.tick_interval_ms)
    }

    /// Error log location; relative paths resolve against `base`
    pub fn journal_path(&self, base: &Path) -> PathBuf {
        if self.journal.file.is_absolute() {
            self.journal.file.clone()
        } else {
            base.join(&self.journal.file)
        }
    }

    /// Example file with every default spelled out
    pub fn example() -> Result<String> {
        toml::to_string_pretty(&Self::default()).context("Failed to serialize default config")
    }
}

/// `<config dir>/overseer/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("overseer").join("config.toml"))
}

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    100
}

fn default_metadata_retries() -> u32 {
    DEFAULT_METADATA_RETRIES
}

fn default_read_retries() -> u32 {
    DEFAULT_READ_RETRIES
}

fn default_system_code_page() -> String {
    DEFAULT_SYSTEM_CODE_PAGE.to_string()
}

fn default_journal_file() -> PathBuf {
    PathBuf::from("overseer-errors.log")
}

fn default_min_priority() -> Priority {
    Priority::Info
}
