//! File discovery and change polling for Overseer
//!
//! This crate provides:
//! - Recursive scans for input/output file pairs that collect per-path errors
//! - A polling change watcher with bounded retries and edge-triggered loss reports
//! - Watched files that re-read on change and restore content after failed writes
//! - Caller-side transcoding and elapsed-time formatting

pub mod config;
pub mod elapsed;
pub mod error;
pub mod poll;
pub mod scan;
pub mod session;
pub mod set;
pub mod text;

// Re-exports
pub use config::WatcherConfig;
pub use elapsed::{format_elapsed, format_since, Language, Period, PeriodNames};
pub use error::WatchError;
pub use poll::{ChangeWatcher, WatchState};
pub use scan::{
    locate_io_pairs, scan_for_name, scan_for_pair, scan_for_pair_two_pass, FilePair,
    FilePathError, ScanOutcome,
};
pub use session::{ReadOutcome, Refresh, Snapshot, WatchedFile, WriteOutcome};
pub use set::{TickEvent, WatchSet, WatchedPair};
pub use text::TextCodec;
