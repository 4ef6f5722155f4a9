//! Directory to zip compression

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Write every file under `dir` into a new zip at `zip_path`, named by its
/// `/`-separated path relative to `dir`. Returns the number of files written.
pub fn compress_dir(dir: &Path, zip_path: &Path) -> Result<usize> {
    let file = File::create(zip_path)
        .with_context(|| format!("Failed to create {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk package directory")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let archive_name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(archive_name.as_str(), options)
            .with_context(|| format!("Failed to add {} to zip", archive_name))?;
        let mut source = File::open(entry.path())
            .with_context(|| format!("Failed to open {}", entry.path().display()))?;
        io::copy(&mut source, &mut zip)
            .with_context(|| format!("Failed to compress {}", entry.path().display()))?;
        count += 1;
    }

    zip.finish().context("Failed to finalize zip")?;

    Ok(count)
}
