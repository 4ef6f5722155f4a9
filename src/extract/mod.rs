//! Pull target textures out of an archive, dropping content already seen

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::archive::ArchiveReader;
use crate::hash::ContentHash;
use crate::package::Texture;

#[derive(Debug, Default)]
pub struct Extraction {
    /// Newly seen textures, in target-name order.
    pub textures: Vec<Texture>,
    pub duplicates: usize,
}

/// For each target name, extract the first entry whose path ends with that
/// name and whose content is new to `seen` into `output_root/<counter>/<name>`.
///
/// Entry-level problems (missing or unreadable entries) are logged and
/// skipped. Filesystem failures on the output side are returned.
pub fn extract_and_dedup(
    archive: &mut dyn ArchiveReader,
    target_names: &[String],
    output_root: &Path,
    counter: u64,
    seen: &mut HashSet<ContentHash>,
) -> Result<Extraction> {
    let mut extraction = Extraction::default();
    let entry_names = archive.entry_names();

    for target in target_names {
        let mut accepted = false;
        let mut unreadable = false;

        for entry_name in entry_names.iter().filter(|n| n.ends_with(target.as_str())) {
            let temp_path = output_root.join(counter.to_string()).join(target);
            if let Some(parent) = temp_path.parent() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }

            let mut reader = match archive.open_entry(entry_name) {
                Ok(reader) => reader,
                Err(e) => {
                    warn!("Cannot open {} in archive: {}", entry_name, e);
                    unreadable = true;
                    break;
                }
            };

            let mut out = File::create(&temp_path)
                .with_context(|| format!("Failed to create {}", temp_path.display()))?;
            if let Err(e) = io::copy(&mut reader, &mut out) {
                drop(out);
                fs::remove_file(&temp_path)
                    .with_context(|| format!("Failed to remove {}", temp_path.display()))?;
                warn!("Failed to read {} from archive: {}", entry_name, e);
                unreadable = true;
                break;
            }
            drop(out);

            let hash = ContentHash::of_file(&temp_path)?;
            if !seen.insert(hash) {
                info!("Image {} skipped (already copied, {})", target, hash);
                fs::remove_file(&temp_path)
                    .with_context(|| format!("Failed to remove {}", temp_path.display()))?;
                extraction.duplicates += 1;
                continue;
            }

            info!(
                "Extracted {} from archive entry {} to {}",
                target,
                entry_name,
                temp_path.display()
            );
            extraction.textures.push(Texture {
                name: target.clone(),
                source: temp_path,
            });
            accepted = true;
            break;
        }

        if !accepted && !unreadable {
            warn!("File {} not found in archive", target);
        }
    }

    Ok(extraction)
}
