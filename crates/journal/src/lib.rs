//! Error reporting for Overseer
//!
//! This crate provides:
//! - The report model (`Priority`, `Report`)
//! - The `ReportSink` seam the engine reports through
//! - `ErrorJournal`, a lazily started append-only log file
//! - `MemorySink` and `NullSink` for tests and quiet runs

pub mod journal;
pub mod report;

// Re-exports
pub use journal::ErrorJournal;
pub use report::{MemorySink, NullSink, Priority, Report, ReportSink};
