//! List input/output pairs under a root

use super::Context;
use anyhow::{Context as _, Result};
use overseer_cli::util;
use overseer_watcher::{locate_io_pairs, FilePair, FilePathError};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub json: bool,
    pub no_synthesize: bool,
    pub input: Option<String>,
    pub output: Option<String>,
}

#[derive(Serialize)]
struct ScanReport<'a> {
    root: &'a Path,
    pairs: Vec<PairView>,
    errors: &'a [FilePathError],
}

#[derive(Serialize)]
struct PairView {
    directory: Option<PathBuf>,
    input: Option<PathBuf>,
    input_exists: bool,
    output: Option<PathBuf>,
    output_exists: bool,
}

impl From<&FilePair> for PairView {
    fn from(pair: &FilePair) -> Self {
        Self {
            directory: pair.directory().map(Path::to_path_buf),
            input: pair.input.clone(),
            input_exists: pair.input_exists(),
            output: pair.output.clone(),
            output_exists: pair.output_exists(),
        }
    }
}

pub async fn run(ctx: &Context, options: ScanOptions) -> Result<()> {
    let input_name = options.input.as_deref().unwrap_or(&ctx.config.input_name);
    let output_name = options.output.as_deref().unwrap_or(&ctx.config.output_name);
    if input_name == output_name {
        anyhow::bail!("Input and output names must differ");
    }
    let synthesize = ctx.config.synthesize_missing && !options.no_synthesize;

    let outcome = locate_io_pairs(input_name, output_name, &ctx.root, synthesize);
    ctx.report_scan_errors(&outcome.errors);

    if options.json {
        let report = ScanReport {
            root: &ctx.root,
            pairs: outcome.matches.iter().map(PairView::from).collect(),
            errors: &outcome.errors,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize scan")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", "Scan Results".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Root:    {}", ctx.root.display().to_string().cyan());
    println!("Names:   {} / {}", input_name, output_name);
    println!();

    if outcome.matches.is_empty() {
        println!("  {}", "No pairs found".dimmed());
    }
    for pair in &outcome.matches {
        let directory = pair
            .directory()
            .map(|dir| util::display_relative(dir, &ctx.root))
            .unwrap_or_else(|| ".".to_string());
        println!("{}", directory.bold());
        print_side("input ", pair.input.as_deref());
        print_side("output", pair.output.as_deref());
    }

    if !outcome.errors.is_empty() {
        println!();
        println!("{}", format!("{} path(s) could not be inspected:", outcome.errors.len()).yellow());
        for error in &outcome.errors {
            println!("  {}", error);
        }
    }

    println!();
    println!("{} pair(s)", outcome.matches.len());
    Ok(())
}

fn print_side(label: &str, path: Option<&Path>) {
    let Some(path) = path else {
        println!("  {}  {}", label, "-".dimmed());
        return;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match util::file_size(path) {
        Some(size) => println!("  {}  {} ({})", label, name.green(), util::format_size(size)),
        None => println!("  {}  {} {}", label, name.dimmed(), "(missing)".yellow()),
    }
}
