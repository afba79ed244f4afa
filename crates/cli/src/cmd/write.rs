//! Write text to a file in a chosen encoding

use super::Context;
use anyhow::{Context as _, Result};
use overseer_core::{Encoding, OpenMode, TextFile};
use overseer_journal::Report;
use overseer_watcher::session::CONVERSION_FAILED_MESSAGE;
use overseer_watcher::{WatchedFile, WriteOutcome};
use owo_colors::OwoColorize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub encoding: Encoding,
    /// Append instead of replacing the content
    pub append: bool,
    /// Terminate the text with the encoding's CR LF
    pub line: bool,
}

pub async fn run(ctx: &Context, path: &Path, text: &str, options: WriteOptions) -> Result<()> {
    let encoding = resolve_encoding(ctx, path, options.encoding)?;

    if options.append || options.line {
        append(ctx, path, text, encoding, options.line)?;
    } else {
        replace(ctx, path, text, encoding)?;
    }

    println!("Wrote {} [{}]", path.display(), encoding);
    Ok(())
}

/// `auto` keeps the encoding of an existing file; new files get UTF-8
fn resolve_encoding(ctx: &Context, path: &Path, requested: Encoding) -> Result<Encoding> {
    if requested != Encoding::Unknown {
        return Ok(requested);
    }
    if !path.is_file() {
        return Ok(Encoding::Utf8);
    }

    let mut file = TextFile::new(path);
    file.set_utf8_policy(ctx.config.watcher_config().utf8_policy());
    let mut session = file
        .session(OpenMode::Read)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(session.update_encoding_from_bom()?)
}

fn replace(ctx: &Context, path: &Path, text: &str, encoding: Encoding) -> Result<()> {
    let file = WatchedFile::new(path, &ctx.config.watcher_config(), ctx.sink())?;
    file.set_encoding(encoding);

    match file.write_text(text) {
        Ok(WriteOutcome::Written) => Ok(()),
        Ok(WriteOutcome::Busy) => anyhow::bail!("{} is busy", path.display()),
        Err(e) => {
            eprintln!(
                "{}",
                format!("Could not write as {}; content was saved as utf-8 instead", encoding)
                    .yellow()
            );
            Err(e).with_context(|| format!("Failed to write {}", path.display()))
        }
    }
}

fn append(ctx: &Context, path: &Path, text: &str, encoding: Encoding, line: bool) -> Result<()> {
    let codec = ctx.config.watcher_config().codec()?;
    let bytes = match codec.encode(text, encoding) {
        Ok(bytes) => bytes,
        Err(e) => {
            ctx.sink().report(
                &Report::critical(e.os_code(), CONVERSION_FAILED_MESSAGE)
                    .with_detail(path.display().to_string()),
            );
            return Err(e).with_context(|| format!("Failed to append to {}", path.display()));
        }
    };

    let mut file = TextFile::with_encoding(path, encoding);
    let mut session = file
        .session(OpenMode::Append)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    if line {
        session.write_line(bytes.as_slice())?;
    } else {
        session.write_some(bytes.as_slice())?;
    }
    session.flush()?;
    Ok(())
}
