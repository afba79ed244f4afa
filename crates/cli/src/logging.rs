//! Diagnostic logging for the `overseer` binary.
//!
//! Logs go to stderr so that stdout stays clean for `--json` output.
//! `RUST_LOG` overrides the default level:
//! ```bash
//! RUST_LOG=debug overseer watch .
//! RUST_LOG=overseer_watcher=trace overseer scan
//! ```
//!
//! With `--log-dir`, a second layer mirrors every event into
//! `<dir>/overseer.log` through a non-blocking writer.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Level used when `RUST_LOG` is unset
pub const DEFAULT_LEVEL: &str = "warn";

/// File name of the diagnostic log inside `--log-dir`
pub const LOG_FILE_NAME: &str = "overseer.log";

fn filter(default: &str) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(default)
    }
}

/// Install the global subscriber.
///
/// Keep the returned guard alive until exit; dropping it flushes the file
/// writer. Only the first call in a process installs anything.
pub fn init(log_dir: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default = if verbose { "debug" } else { DEFAULT_LEVEL };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter(default));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer)
                .with_filter(filter("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
