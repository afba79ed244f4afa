//! Errors for the watcher layer

use overseer_core::{ErrorCategory, TextFileError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    File(#[from] TextFileError),

    #[error("unknown code page label '{0}'")]
    UnknownCodePage(String),

    #[error("invalid watcher configuration: {0}")]
    InvalidConfig(String),
}

impl WatchError {
    /// Failure class, for callers that surface errors by category
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::File(e) => e.category(),
            WatchError::UnknownCodePage(_) => ErrorCategory::Conversion,
            WatchError::InvalidConfig(_) => ErrorCategory::Open,
        }
    }
}
