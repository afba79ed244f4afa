//! Overseer CLI - overseer command

use anyhow::Result;
use clap::{Parser, Subcommand};
use overseer_core::Encoding;
use overseer_watcher::Language;
use std::path::PathBuf;

mod cmd;

use cmd::{Context, GlobalOptions};

/// Overseer - Watch input/output text files in any encoding
#[derive(Parser)]
#[command(name = "overseer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: <root>/overseer.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the diagnostic log and the error journal
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Status text language (english, korean)
    #[arg(long, global = true, value_parser = cmd::parse_language)]
    language: Option<Language>,

    /// Debug-level diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find input/output file pairs under a directory
    Scan {
        /// Root directory (default: configured root or current directory)
        root: Option<PathBuf>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
        /// Don't fill in the missing side of a pair
        #[arg(long)]
        no_synthesize: bool,
        /// Input file name (default: input.txt)
        #[arg(long)]
        input: Option<String>,
        /// Output file name (default: output.txt)
        #[arg(long)]
        output: Option<String>,
    },
    /// Poll pairs and reload files when they change
    Watch {
        /// Root directory (default: configured root or current directory)
        root: Option<PathBuf>,
        /// Stop after this many ticks (default: run until Ctrl-C)
        #[arg(long)]
        ticks: Option<u64>,
        /// Poll interval in milliseconds (default: from config, 100)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Print file content after each reload
        #[arg(long)]
        show_text: bool,
    },
    /// Print a file, detecting its encoding
    Cat {
        file: PathBuf,
        /// Print the detected encoding and size first
        #[arg(long)]
        info: bool,
    },
    /// Write text to a file
    Write {
        file: PathBuf,
        text: String,
        /// auto, ansi, utf-8, utf-8-no-bom or utf-16le (default: utf-8)
        #[arg(short, long, default_value = "utf-8")]
        encoding: Encoding,
        /// Append instead of replacing
        #[arg(long)]
        append: bool,
        /// Append the text followed by CR LF
        #[arg(long)]
        line: bool,
    },
    /// Show the effective configuration
    Config {
        /// Print a default config file instead
        #[arg(long)]
        example: bool,
    },
    /// List supported encodings
    Encodings,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = overseer_cli::logging::init(cli.log_dir.as_deref(), cli.verbose);

    let options = GlobalOptions {
        config: cli.config,
        log_dir: cli.log_dir,
        language: cli.language,
    };

    match cli.command {
        Commands::Scan { root, json, no_synthesize, input, output } => {
            let ctx = Context::load(&options, root.as_deref())?;
            let scan = cmd::scan::ScanOptions { json, no_synthesize, input, output };
            cmd::scan::run(&ctx, scan).await
        }
        Commands::Watch { root, ticks, interval_ms, show_text } => {
            let ctx = Context::load(&options, root.as_deref())?;
            let watch = cmd::watch::WatchOptions { ticks, interval_ms, show_text };
            cmd::watch::run(&ctx, watch).await
        }
        Commands::Cat { file, info } => {
            let ctx = Context::load(&options, None)?;
            cmd::cat::run(&ctx, &file, info).await
        }
        Commands::Write { file, text, encoding, append, line } => {
            let ctx = Context::load(&options, None)?;
            let write = cmd::write::WriteOptions { encoding, append, line };
            cmd::write::run(&ctx, &file, &text, write).await
        }
        Commands::Config { example } => {
            if example {
                cmd::config::example().await
            } else {
                let ctx = Context::load(&options, None)?;
                cmd::config::run(&ctx).await
            }
        }
        Commands::Encodings => cmd::encodings::run().await,
    }
}
