//! Typed errors for the text file engine

use crate::encoding::Encoding;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Broad failure classes shared by the engine, scanner and watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Bad path, already open, or wrong open mode
    Open,
    /// Character not representable in the target encoding
    Conversion,
    /// Caller buffer too small or of the wrong width
    Size,
    /// Last-write-time query failed
    Metadata,
    /// Directory or entry inaccessible during a scan
    Scan,
    /// Any other OS-level read or write failure
    Io,
}

/// Errors produced by [`crate::TextFile`] and the caller-side codecs
#[derive(Error, Debug)]
pub enum TextFileError {
    #[error("file path is empty")]
    EmptyPath,

    #[error("file is already open: {}", .0.display())]
    AlreadyOpen(PathBuf),

    #[error("file is not open")]
    NotOpen,

    #[error("file is not open for reading")]
    NotReadable,

    #[error("file is not open for writing")]
    NotWritable,

    #[error("buffer too small: {required} code units required, {capacity} available")]
    BufferTooSmall { required: usize, capacity: usize },

    #[error("{width}-byte code units are not supported for {encoding}")]
    UnsupportedWidth { width: usize, encoding: Encoding },

    #[error("character {ch:?} cannot be represented in {target}")]
    Unmappable { ch: char, target: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TextFileError {
    /// Failure class of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            TextFileError::EmptyPath
            | TextFileError::AlreadyOpen(_)
            | TextFileError::NotOpen
            | TextFileError::NotReadable
            | TextFileError::NotWritable => ErrorCategory::Open,
            TextFileError::BufferTooSmall { .. } | TextFileError::UnsupportedWidth { .. } => {
                ErrorCategory::Size
            }
            TextFileError::Unmappable { .. } => ErrorCategory::Conversion,
            TextFileError::Io(_) => ErrorCategory::Io,
        }
    }

    /// Raw OS error code, or 0 when the error did not come from the OS
    pub fn os_code(&self) -> i32 {
        match self {
            TextFileError::Io(e) => e.raw_os_error().unwrap_or(0),
            _ => 0,
        }
    }
}
