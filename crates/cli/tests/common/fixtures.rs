//! Task trees on disk for integration tests

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding input/output pairs
pub struct TaskTree {
    dir: TempDir,
}

impl TaskTree {
    pub fn new() -> Result<Self> {
        Ok(Self { dir: TempDir::new()? })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write raw bytes to `relative`, creating parent directories
    pub fn file(&self, relative: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn read(&self, relative: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.dir.path().join(relative))?)
    }
}

/// `text` as UTF-8 with a BOM
pub fn utf8_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// `text` as UTF-16LE with a BOM
pub fn utf16le_bom(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    bytes
}
