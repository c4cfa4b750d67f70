//! Directory scanner: turns a folder of files into hashed ROM items.
//!
//! Each first-level subdirectory becomes a machine and every file beneath
//! it a ROM named by its path relative to that subdirectory (always with
//! `/` separators). Files directly in the root become single-ROM machines
//! named after the file stem.

use std::path::{Path, PathBuf};

use datkit_core::{DatItem, ItemKind, Machine, Rom, Source};

use crate::error::DatError;
use crate::hasher::hash_file;

/// Result of a directory scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// One ROM item per readable file, sorted by machine then path
    pub items: Vec<DatItem>,
    /// Files that could not be read or hashed
    pub failures: Vec<(PathBuf, DatError)>,
}

/// Scan `root` and hash every file found.
pub fn scan_directory(root: &Path, source: &Source) -> Result<ScanOutcome, DatError> {
    scan_directory_with_progress(root, source, &|_| {})
}

/// Like [`scan_directory`], calling `on_file` before each file is hashed.
///
/// Unreadable files are collected in [`ScanOutcome::failures`]; only an
/// unreadable `root` fails the whole scan.
pub fn scan_directory_with_progress(
    root: &Path,
    source: &Source,
    on_file: &dyn Fn(&Path),
) -> Result<ScanOutcome, DatError> {
    let mut outcome = ScanOutcome::default();

    for entry in sorted_entries(root)? {
        let path = entry.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if path.is_dir() {
            let machine = Machine::new(name);
            let mut files = Vec::new();
            collect_files(&path, &mut files, &mut outcome.failures);
            for file in files {
                let rel = relative_name(&path, &file);
                hash_into(&mut outcome, &file, rel, &machine, source, on_file);
            }
        } else if path.is_file() {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            let machine = Machine::new(stem);
            hash_into(&mut outcome, &path, name, &machine, source, on_file);
        }
    }

    log::debug!(
        "Scanned {}: {} files hashed, {} failed",
        root.display(),
        outcome.items.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<std::fs::DirEntry>> {
    let mut entries: Vec<std::fs::DirEntry> = std::fs::read_dir(dir)?.flatten().collect();
    entries.sort_by_key(|e| e.path());
    Ok(entries)
}

/// Recursively collect files under `dir` in sorted order.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>, failures: &mut Vec<(PathBuf, DatError)>) {
    let entries = match sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read directory {}: {e}", dir.display());
            failures.push((dir.to_path_buf(), e.into()));
            return;
        }
    };
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, files, failures);
        } else if path.is_file() {
            files.push(path);
        }
    }
}

fn relative_name(base: &Path, file: &Path) -> String {
    let rel = file.strip_prefix(base).unwrap_or(file);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn hash_into(
    outcome: &mut ScanOutcome,
    path: &Path,
    name: String,
    machine: &Machine,
    source: &Source,
    on_file: &dyn Fn(&Path),
) {
    on_file(path);
    match hash_file(path) {
        Ok(hash) => {
            let rom = Rom::new(name).with_hash(hash);
            outcome
                .items
                .push(DatItem::new(ItemKind::Rom(rom), machine.clone(), source.clone()));
        }
        Err(e) => {
            log::warn!("Failed to hash {}: {e}", path.display());
            outcome.failures.push((path.to_path_buf(), e));
        }
    }
}
