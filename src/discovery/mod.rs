// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Bag discovery.
//!
//! A bag directory directly contains `metadata.yaml` and at least one
//! `*.db3` segment. Discovery walks a tree and stops descending as soon as
//! a directory qualifies, so returned bags never nest.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::io::metadata::{DB3_EXTENSION, METADATA_FILE};
use crate::Result;

/// Check whether `path` is a bag directory.
///
/// Returns false for non-directories and unreadable directories.
pub fn is_bag(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    if !path.is_dir() || !path.join(METADATA_FILE).is_file() {
        return false;
    }

    match fs::read_dir(path) {
        Ok(entries) => entries.filter_map(|e| e.ok()).any(|entry| {
            let entry_path = entry.path();
            entry_path.is_file()
                && entry_path
                    .extension()
                    .is_some_and(|ext| ext == DB3_EXTENSION)
        }),
        Err(_) => false,
    }
}

/// Find every bag directory under `root` (the root included).
///
/// The result is sorted by path. Unreadable subdirectories are logged
/// and skipped. Symlinked directories below `root` are not followed.
pub fn find_bags(root: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut bags = Vec::new();

    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        if is_bag(entry.path()) {
            debug!(bag = %entry.path().display(), "found bag");
            bags.push(entry.into_path());
            walker.skip_current_dir();
        }
    }

    bags.sort();
    Ok(bags)
}
