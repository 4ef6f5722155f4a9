//! Build a numbered resource pack around found textures

pub mod compress;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

use crate::utils::copy_dir_merge;

/// File name every package carries at its root.
pub const PACK_ICON: &str = "pack.png";

/// Where item textures live inside a resource pack.
pub const ITEM_TEXTURES_DIR: &[&str] = &["assets", "minecraft", "textures", "items"];

/// A texture selected for packaging: the target name it was found under and
/// where its bytes currently are.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub name: String,
    pub source: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BuiltPackage {
    pub number: u64,
    pub zip_path: PathBuf,
    pub collection_copy: Option<PathBuf>,
}

pub struct Packager {
    output_root: PathBuf,
    template_dir: PathBuf,
    prefix: String,
    collection_dir: Option<PathBuf>,
}

impl Packager {
    pub fn new(
        output_root: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        collection_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            output_root: output_root.into(),
            template_dir: template_dir.into(),
            prefix: prefix.into(),
            collection_dir,
        }
    }

    /// `<prefix><number>`, the stem of both the work directory and the zip.
    pub fn package_name(&self, number: u64) -> String {
        format!("{}{}", self.prefix, number)
    }

    /// Lay out `textures` over the template under `output_root/<number>/`,
    /// compress it to `<prefix><number>.zip` and drop the work directory.
    ///
    /// When several textures are given, each lands at its own item path but
    /// they share the root `pack.png`, so the last one wins there.
    pub fn build(&self, number: u64, textures: &[Texture]) -> Result<BuiltPackage> {
        let number_dir = self.output_root.join(number.to_string());
        let name = self.package_name(number);

        let work_dir = self.create_work_dir(&number_dir, &name)?;
        info!("Temporary directory created: {}", work_dir.path().display());

        let items_dir = ITEM_TEXTURES_DIR
            .iter()
            .fold(work_dir.path().to_path_buf(), |acc, part| acc.join(part));

        for texture in textures {
            let icon = work_dir.path().join(PACK_ICON);
            fs::copy(&texture.source, &icon).with_context(|| {
                format!("Failed to copy {} to {}", texture.source.display(), icon.display())
            })?;
            info!("Copied {} as {} in {}", texture.name, PACK_ICON, work_dir.path().display());

            fs::create_dir_all(&items_dir)
                .with_context(|| format!("Failed to create {}", items_dir.display()))?;
            let item = items_dir.join(&texture.name);
            fs::copy(&texture.source, &item).with_context(|| {
                format!("Failed to copy {} to {}", texture.source.display(), item.display())
            })?;
            info!("Added a copy of {} in {}", texture.name, items_dir.display());
        }

        copy_dir_merge(&self.template_dir, work_dir.path())?;
        info!(
            "Copied template {} into {}",
            self.template_dir.display(),
            work_dir.path().display()
        );

        let zip_path = number_dir.join(format!("{}.zip", name));
        let files = compress::compress_dir(work_dir.path(), &zip_path)?;
        info!(
            "Compressed {} ({} files) into {}",
            work_dir.path().display(),
            files,
            zip_path.display()
        );

        let collection_copy = match &self.collection_dir {
            Some(dir) => Some(self.copy_to_collection(&zip_path, dir, &name)?),
            None => None,
        };

        let work_path = work_dir.path().to_path_buf();
        work_dir
            .close()
            .with_context(|| format!("Failed to remove {}", work_path.display()))?;
        info!("Temporary directory removed: {}", work_path.display());

        Ok(BuiltPackage {
            number,
            zip_path,
            collection_copy,
        })
    }

    /// Work directory at exactly `number_dir/<name>`, removed on drop so an
    /// early return never leaves it behind.
    fn create_work_dir(&self, number_dir: &Path, name: &str) -> Result<TempDir> {
        fs::create_dir_all(number_dir)
            .with_context(|| format!("Failed to create {}", number_dir.display()))?;

        let stale = number_dir.join(name);
        if stale.exists() {
            fs::remove_dir_all(&stale)
                .with_context(|| format!("Failed to clear stale {}", stale.display()))?;
        }

        tempfile::Builder::new()
            .prefix(name)
            .rand_bytes(0)
            .tempdir_in(number_dir)
            .with_context(|| format!("Failed to create {}", stale.display()))
    }

    fn copy_to_collection(&self, zip_path: &Path, dir: &Path, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let copy = dir.join(format!("{}.zip", name));
        fs::copy(zip_path, &copy).with_context(|| {
            format!("Failed to copy {} to {}", zip_path.display(), copy.display())
        })?;
        info!("Copied {} to {}", zip_path.display(), copy.display());
        Ok(copy)
    }
}
