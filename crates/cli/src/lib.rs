//! Shared pieces of the `overseer` command-line tool
//!
//! - `config`: `overseer.toml` loading and discovery
//! - `logging`: tracing subscriber setup
//! - `util`: formatting and path helpers for commands

pub mod config;
pub mod logging;
pub mod util;

pub use config::OverseerConfig;
