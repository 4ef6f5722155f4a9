//! Common filesystem helpers

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;
use walkdir::WalkDir;

/// Recursively copy the contents of `src` into `dst`, merging with whatever
/// `dst` already holds. Files from `src` overwrite existing ones.
pub fn copy_dir_merge(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        anyhow::bail!("Template directory does not exist: {}", src.display());
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove `dir` only when it holds nothing.
pub fn remove_dir_if_empty(dir: &Path) {
    let is_empty = fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if !is_empty {
        return;
    }
    if let Err(e) = fs::remove_dir(dir) {
        warn!("Failed to remove empty directory {}: {}", dir.display(), e);
    }
}
