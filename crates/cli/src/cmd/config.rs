//! Show the effective configuration

use super::Context;
use anyhow::{Context as _, Result};
use overseer_cli::config::user_config_path;
use overseer_cli::OverseerConfig;
use owo_colors::OwoColorize;

pub async fn run(ctx: &Context) -> Result<()> {
    match &ctx.config_source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# No config file found, using defaults"),
    }
    if let Some(path) = ctx.journal_path() {
        println!("# Error journal: {}", path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(&ctx.config).context("Failed to serialize config")?;
    print!("{}", rendered);
    Ok(())
}

/// Print a default configuration file
pub async fn example() -> Result<()> {
    if let Some(path) = user_config_path() {
        eprintln!("{}", format!("# Save as overseer.toml or {}", path.display()).dimmed());
    }
    print!("{}", OverseerConfig::example()?);
    Ok(())
}
