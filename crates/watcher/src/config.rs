//! Watcher configuration

use crate::error::WatchError;
use crate::text::TextCodec;
use overseer_core::Utf8Policy;
use serde::{Deserialize, Serialize};

/// Default bound on last-write-time queries per check
pub const DEFAULT_METADATA_RETRIES: u32 = 5;

/// Default bound on read attempts after a change
pub const DEFAULT_READ_RETRIES: u32 = 3;

/// Default code page for `System` content
pub const DEFAULT_SYSTEM_CODE_PAGE: &str = "windows-1252";

/// Retry bounds and encoding behaviour for watched files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Attempts per last-write-time query (default: 5)
    #[serde(default = "default_metadata_retries")]
    pub metadata_retries: u32,

    /// Read attempts after a detected change (default: 3)
    #[serde(default = "default_read_retries")]
    pub read_retries: u32,

    /// Classify BOM-less UTF-8 as `utf-8-no-bom` (default: true)
    #[serde(default = "default_true")]
    pub detect_utf8_without_bom: bool,

    /// WHATWG label of the 8-bit code page used for `System` content
    #[serde(default = "default_system_code_page")]
    pub system_code_page: String,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            metadata_retries: DEFAULT_METADATA_RETRIES,
            read_retries: DEFAULT_READ_RETRIES,
            detect_utf8_without_bom: true,
            system_code_page: DEFAULT_SYSTEM_CODE_PAGE.to_string(),
        }
    }
}

impl WatcherConfig {
    pub fn utf8_policy(&self) -> Utf8Policy {
        if self.detect_utf8_without_bom {
            Utf8Policy::Detect
        } else {
            Utf8Policy::Ignore
        }
    }

    /// Codec for the configured code page
    pub fn codec(&self) -> Result<TextCodec, WatchError> {
        TextCodec::from_label(&self.system_code_page)
    }

    /// Check retry bounds and the code page label
    pub fn validate(&self) -> Result<(), WatchError> {
        if !(1..=100).contains(&self.metadata_retries) {
            return Err(WatchError::InvalidConfig(format!(
                "metadata_retries must be between 1 and 100, got {}",
                self.metadata_retries
            )));
        }
        if !(1..=100).contains(&self.read_retries) {
            return Err(WatchError::InvalidConfig(format!(
                "read_retries must be between 1 and 100, got {}",
                self.read_retries
            )));
        }
        self.codec()?;
        Ok(())
    }
}

fn default_metadata_retries() -> u32 {
    DEFAULT_METADATA_RETRIES
}

fn default_read_retries() -> u32 {
    DEFAULT_READ_RETRIES
}

fn default_true() -> bool {
    true
}

fn default_system_code_page() -> String {
    DEFAULT_SYSTEM_CODE_PAGE.to_string()
}
