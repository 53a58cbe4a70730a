//! Mod folder discovery.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Walk the root mods directory and return the folders to treat as mods.
///
/// Mods are the immediate child directories of the root. Distributions are
/// commonly zipped with an extra enclosing folder, so each child is unwrapped
/// while it contains no files and exactly one subdirectory. Children are
/// returned in name order so the pipeline output is stable across runs.
///
/// A missing or unreadable root is an error; unreadable children are skipped
/// with a warning.
pub fn discover_mod_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read mods directory {}", root.display()))?;

    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                tracing::warn!("Skipping unreadable entry in {}: {err}", root.display());
                None
            }
        })
        .filter(|path| path.is_dir())
        .collect();
    children.sort_by_key(|path| path.file_name().map(|name| name.to_os_string()));

    Ok(children.into_iter().map(unwrap_wrapper_folders).collect())
}

/// While the directory contains no files and exactly one subdirectory,
/// descend into that subdirectory.
fn unwrap_wrapper_folders(mut dir: PathBuf) -> PathBuf {
    loop {
        let Ok(entries) = fs::read_dir(&dir) else {
            tracing::warn!("Skipping unreadable mod folder {}", dir.display());
            return dir;
        };

        let mut subdirs = Vec::new();
        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            } else {
                // A file at this level means the folder is the mod itself.
                return dir;
            }
        }

        match subdirs.as_slice() {
            [only] => dir = only.clone(),
            _ => return dir,
        }
    }
}
