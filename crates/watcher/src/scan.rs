//! Directory scanning and input/output pair discovery
//!
//! Scans never abort on a bad entry: every failure is recorded as a
//! [`FilePathError`] next to the matches found so far.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Default name of the input file in each directory
pub const DEFAULT_INPUT_NAME: &str = "input.txt";

/// Default name of the output file in each directory
pub const DEFAULT_OUTPUT_NAME: &str = "output.txt";

/// A path that could not be inspected during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePathError {
    pub path: PathBuf,
    /// Raw OS error code, or 0 when unavailable
    pub code: i32,
    pub message: String,
}

impl FilePathError {
    pub fn new(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self {
            path: path.into(),
            code: error.raw_os_error().unwrap_or(0),
            message: error.to_string(),
        }
    }

    fn from_walk(error: &walkdir::Error, fallback: &Path) -> Self {
        let path = error.path().unwrap_or(fallback).to_path_buf();
        match error.io_error() {
            Some(io_error) => Self::new(path, io_error),
            None => Self {
                path,
                code: 0,
                message: error.to_string(),
            },
        }
    }
}

impl fmt::Display for FilePathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.message, self.code, self.path.display())
    }
}

/// Input and output file of one directory. `None` means not found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilePair {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl FilePair {
    pub fn new(input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self { input, output }
    }

    /// Directory holding whichever side is known
    pub fn directory(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .or(self.output.as_deref())
            .and_then(Path::parent)
    }

    /// Whether the input side exists on disk (false for synthesized paths)
    pub fn input_exists(&self) -> bool {
        self.input.as_deref().map_or(false, Path::is_file)
    }

    /// Whether the output side exists on disk (false for synthesized paths)
    pub fn output_exists(&self) -> bool {
        self.output.as_deref().map_or(false, Path::is_file)
    }

    fn is_empty(&self) -> bool {
        self.input.is_none() && self.output.is_none()
    }
}

/// Matches and per-path errors of a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome<T> {
    pub matches: Vec<T>,
    pub errors: Vec<FilePathError>,
}

impl<T> Default for ScanOutcome<T> {
    fn default() -> Self {
        Self {
            matches: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<T> ScanOutcome<T> {
    /// Append another outcome, keeping traversal order
    pub fn merge(&mut self, other: ScanOutcome<T>) {
        self.matches.extend(other.matches);
        self.errors.extend(other.errors);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Find every regular file called `name` under `root`.
///
/// Each directory's own matches come before those of its subdirectories.
/// With `recursive` unset only the direct entries of `root` are inspected.
/// Symlinks are followed; a directory reached twice is walked once.
pub fn scan_for_name(name: &str, root: &Path, recursive: bool) -> ScanOutcome<PathBuf> {
    let mut outcome = ScanOutcome::default();
    if let Err(e) = fs::read_dir(root) {
        outcome.errors.push(FilePathError::new(root, &e));
        return outcome;
    }

    let mut visited = visited_from(root);
    let mut walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));
    if !recursive {
        walker = walker.max_depth(1);
    }

    let entries = walker.into_iter().filter_entry(|entry| {
        !entry.file_type().is_dir() || first_visit(&mut visited, entry.path())
    });

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                debug!("Directory already scanned: {}", e);
                continue;
            }
            Err(e) => {
                debug!("Scan error under {}: {}", root.display(), e);
                outcome.errors.push(FilePathError::from_walk(&e, root));
                continue;
            }
        };

        if entry.file_name() == name && entry.file_type().is_file() {
            outcome.matches.push(entry.into_path());
        }
    }

    outcome
}

/// Find `name_a` / `name_b` in one pass per directory.
///
/// Every directory holding at least one of the names yields one pair
/// (`input` = `name_a`, `output` = `name_b`). Subdirectories collected
/// during the pass are visited afterwards. Symlinks count as their target;
/// one whose target cannot be resolved is recorded as an error.
pub fn scan_for_pair(
    name_a: &str,
    name_b: &str,
    root: &Path,
    recursive: bool,
) -> ScanOutcome<FilePair> {
    let mut outcome = ScanOutcome::default();
    let mut visited = visited_from(root);
    scan_dir_for_pair(name_a, name_b, root, recursive, &mut visited, &mut outcome);
    outcome
}

fn scan_dir_for_pair(
    name_a: &str,
    name_b: &str,
    dir: &Path,
    recursive: bool,
    visited: &mut HashSet<PathBuf>,
    outcome: &mut ScanOutcome<FilePair>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            outcome.errors.push(FilePathError::new(dir, &e));
            return;
        }
    };

    let mut pair = FilePair::default();
    let mut subdirs = Vec::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                outcome.errors.push(FilePathError::new(dir, &e));
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                outcome.errors.push(FilePathError::new(path, &e));
                continue;
            }
        };

        let (is_dir, is_file) = if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) => (meta.is_dir(), meta.is_file()),
                Err(e) => {
                    outcome.errors.push(FilePathError::new(path, &e));
                    continue;
                }
            }
        } else {
            (file_type.is_dir(), file_type.is_file())
        };

        if is_dir {
            if recursive {
                subdirs.push(path);
            }
            continue;
        }
        if !is_file {
            continue;
        }

        let file_name = entry.file_name();
        if file_name == name_a {
            pair.input = Some(path.clone());
        }
        if file_name == name_b {
            pair.output = Some(path);
        }
    }

    if !pair.is_empty() {
        outcome.matches.push(pair);
    }
    for subdir in subdirs {
        if first_visit(visited, &subdir) {
            scan_dir_for_pair(name_a, name_b, &subdir, recursive, visited, outcome);
        } else {
            debug!("Directory already scanned: {}", subdir.display());
        }
    }
}

fn visited_from(root: &Path) -> HashSet<PathBuf> {
    let mut visited = HashSet::new();
    if let Ok(canonical) = fs::canonicalize(root) {
        visited.insert(canonical);
    }
    visited
}

/// Record `dir` by its canonical path; false when it was seen before
fn first_visit(visited: &mut HashSet<PathBuf>, dir: &Path) -> bool {
    match fs::canonicalize(dir) {
        Ok(canonical) => visited.insert(canonical),
        Err(_) => true,
    }
}

/// Same result shape as [`scan_for_pair`], built from two full
/// [`scan_for_name`] traversals joined by parent directory.
pub fn scan_for_pair_two_pass(
    name_a: &str,
    name_b: &str,
    root: &Path,
    recursive: bool,
) -> ScanOutcome<FilePair> {
    let inputs = scan_for_name(name_a, root, recursive);
    let outputs = scan_for_name(name_b, root, recursive);

    let mut outcome = ScanOutcome {
        matches: Vec::new(),
        errors: inputs.errors,
    };
    for error in outputs.errors {
        if !outcome.errors.contains(&error) {
            outcome.errors.push(error);
        }
    }

    let mut by_dir: HashMap<PathBuf, usize> = HashMap::new();
    let sides = inputs
        .matches
        .into_iter()
        .map(|path| (true, path))
        .chain(outputs.matches.into_iter().map(|path| (false, path)));

    for (is_input, path) in sides {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let index = *by_dir.entry(dir).or_insert_with(|| {
            outcome.matches.push(FilePair::default());
            outcome.matches.len() - 1
        });
        let pair = &mut outcome.matches[index];
        if is_input {
            pair.input = Some(path);
        } else {
            pair.output = Some(path);
        }
    }

    outcome
}

/// Discover input/output pairs anywhere under `root`.
///
/// With `synthesize_missing` set, an absent side is filled in next to the
/// side that exists (`<dir>/<output_name>` or `<dir>/<input_name>`), even
/// though nothing exists there yet.
pub fn locate_io_pairs(
    input_name: &str,
    output_name: &str,
    root: &Path,
    synthesize_missing: bool,
) -> ScanOutcome<FilePair> {
    let mut outcome = scan_for_pair(input_name, output_name, root, true);
    debug!(
        pairs = outcome.matches.len(),
        errors = outcome.errors.len(),
        "Located pairs under {}",
        root.display()
    );

    if synthesize_missing {
        for pair in &mut outcome.matches {
            let Some(dir) = pair.directory().map(Path::to_path_buf) else {
                continue;
            };
            if pair.output.is_none() {
                pair.output = Some(dir.join(output_name));
            }
            if pair.input.is_none() {
                pair.input = Some(dir.join(input_name));
            }
        }
    }

    outcome
}
