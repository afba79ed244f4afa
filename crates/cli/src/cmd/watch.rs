//! Poll input/output pairs and report reloads

use super::Context;
use anyhow::{Context as _, Result};
use overseer_cli::util;
use overseer_watcher::{locate_io_pairs, Refresh, TickEvent, WatchSet, WatchedFile};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Stop after this many ticks instead of waiting for Ctrl-C
    pub ticks: Option<u64>,
    pub interval_ms: Option<u64>,
    pub show_text: bool,
}

pub async fn run(ctx: &Context, options: WatchOptions) -> Result<()> {
    let interval = match options.interval_ms {
        Some(ms) if !(10..=60_000).contains(&ms) => {
            anyhow::bail!("--interval-ms must be between 10 and 60000, got {}", ms)
        }
        Some(ms) => Duration::from_millis(ms),
        None => ctx.config.tick_interval(),
    };

    let outcome = locate_io_pairs(
        &ctx.config.input_name,
        &ctx.config.output_name,
        &ctx.root,
        ctx.config.synthesize_missing,
    );
    ctx.report_scan_errors(&outcome.errors);

    let mut set = WatchSet::from_pairs(outcome.matches, ctx.config.watcher_config(), ctx.sink())
        .context("Failed to set up watched files")?;

    if set.is_empty() {
        println!(
            "No {} / {} pairs under {}",
            ctx.config.input_name,
            ctx.config.output_name,
            ctx.root.display()
        );
        return Ok(());
    }

    println!(
        "Watching {} pair(s) under {} every {} ms",
        set.len(),
        ctx.root.display().to_string().cyan(),
        interval.as_millis()
    );
    info!(pairs = set.len(), root = %ctx.root.display(), "Watch started");

    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = timer.tick() => {
                for event in set.tick() {
                    print_event(ctx, &set, &event, options.show_text);
                }
                ticks += 1;
                if options.ticks.map_or(false, |limit| ticks >= limit) {
                    break;
                }
            }
            _ = &mut shutdown => {
                println!();
                break;
            }
        }
    }

    print_status(ctx, &set);
    info!(ticks, "Watch stopped");
    Ok(())
}

fn find<'a>(set: &'a WatchSet, path: &Path) -> Option<&'a WatchedFile> {
    set.pairs()
        .iter()
        .flat_map(|pair| pair.files())
        .find(|file| file.path() == path)
}

fn print_event(ctx: &Context, set: &WatchSet, event: &TickEvent, show_text: bool) {
    let name = util::display_relative(&event.path, &ctx.root);
    match event.refresh {
        Refresh::Reloaded => {
            let snapshot = find(set, &event.path).and_then(WatchedFile::snapshot);
            match snapshot {
                Some(snapshot) => {
                    println!(
                        "{} {} [{}, {}]",
                        "reloaded".green(),
                        name,
                        snapshot.encoding,
                        util::format_size(snapshot.bytes.len() as u64)
                    );
                    if show_text {
                        for line in snapshot.text.lines() {
                            println!("    {}", line);
                        }
                    }
                }
                None => println!("{} {}", "reloaded".green(), name),
            }
        }
        Refresh::ReadFailed => println!("{} {}", "unreadable".yellow(), name),
        Refresh::Unchanged | Refresh::Missing => {}
    }
}

fn print_status(ctx: &Context, set: &WatchSet) {
    let now = SystemTime::now();
    println!("{}", "Status".bold());
    for pair in set.pairs() {
        for file in pair.files() {
            println!(
                "  {}  {}",
                util::display_relative(file.path(), &ctx.root),
                file.status_line(set.watcher(), now, ctx.names()).dimmed()
            );
        }
    }
}
