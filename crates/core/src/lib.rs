//! Encoding-aware text file engine for Overseer
//!
//! This crate provides:
//! - The encoding model (BOM constants, BOM detection, UTF-8 sniffing)
//! - `TextFile`, a single-owner binary stream that reads and writes
//!   exact bytes together with an encoding tag
//! - Typed errors for open, mode, size and conversion failures
//!
//! Transcoding between encodings is left to callers: the engine only
//! detects, strips and emits byte order marks.

pub mod encoding;
pub mod error;
pub mod file;

// Re-exports
pub use encoding::{detect_bom, utf8_is_valid, Encoding, Utf8Policy};
pub use error::{ErrorCategory, TextFileError};
pub use file::{CodeUnit, OpenMode, TextFile, TextSession};

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, TextFileError>;
