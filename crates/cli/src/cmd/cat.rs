//! Print a text file in any supported encoding

use super::Context;
use anyhow::{Context as _, Result};
use overseer_cli::util;
use overseer_core::{OpenMode, TextFile};
use std::path::Path;

pub async fn run(ctx: &Context, path: &Path, info: bool) -> Result<()> {
    let watcher_config = ctx.config.watcher_config();
    let codec = watcher_config.codec()?;

    let mut file = TextFile::new(path);
    file.set_utf8_policy(watcher_config.utf8_policy());
    let (bytes, encoding) = {
        let mut session = file
            .session(OpenMode::Read)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let bytes = session
            .read_all()
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (bytes, session.encoding())
    };

    if info {
        println!(
            "# {} [{}, {}]",
            path.display(),
            encoding,
            util::format_size(bytes.len() as u64)
        );
    }
    print!("{}", codec.decode(&bytes, encoding));
    Ok(())
}
