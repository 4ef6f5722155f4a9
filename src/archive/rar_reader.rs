use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tempfile::TempDir;

use super::{ArchiveError, ArchiveReader};

/// RAR archives are unpacked once into a private staging directory; the
/// `rar` crate has no per-entry reader. Staging is removed on drop.
///
/// The `rar` crate writes every entry directly under the destination, so
/// archives whose entries live in subfolders fail to open.
pub struct RarReader {
    staging: TempDir,
    /// `/`-separated entry name and the name it was unpacked under.
    entries: Vec<(String, String)>,
}

impl RarReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| ArchiveError::Rar("RAR path contains invalid UTF-8".to_string()))?;

        let staging = tempfile::Builder::new().prefix("texpack_rar").tempdir()?;
        let staging_str = staging
            .path()
            .to_str()
            .ok_or_else(|| ArchiveError::Rar("Staging path contains invalid UTF-8".to_string()))?;

        let archive = rar::Archive::extract_all(path_str, staging_str, "")
            .map_err(|e| ArchiveError::Rar(format!("Failed to extract RAR: {e:?}")))?;

        let entries = archive
            .files
            .iter()
            .filter(|entry| !entry.flags.directory)
            .filter(|entry| staging.path().join(&entry.name).is_file())
            .map(|entry| (entry.name.replace('\\', "/"), entry.name.clone()))
            .collect();

        Ok(Self { staging, entries })
    }

    #[cfg(test)]
    fn staging_dir(&self) -> &Path {
        self.staging.path()
    }
}

impl ArchiveReader for RarReader {
    fn entry_names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>, ArchiveError> {
        let Some((_, raw)) = self.entries.iter().find(|(n, _)| n == name) else {
            return Err(ArchiveError::EntryNotFound(name.to_string()));
        };

        match File::open(self.staging.path().join(raw)) {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ArchiveError::EntryNotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const TEXTURES_RAR: &[u8] = include_bytes!("../../tests/fixtures/textures.rar");
    #[cfg(unix)]
    const BACKSLASH_RAR: &[u8] = include_bytes!("../../tests/fixtures/backslash.rar");

    fn fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_lists_files_and_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = fixture(temp_dir.path(), "textures.rar", TEXTURES_RAR);

        let reader = RarReader::open(&path).unwrap();
        assert_eq!(
            reader.entry_names(),
            vec!["pack.mcmeta".to_string(), "diamond_sword.png".to_string()]
        );
    }

    #[test]
    fn test_open_entry_reads_staged_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = fixture(temp_dir.path(), "textures.rar", TEXTURES_RAR);

        let mut reader = RarReader::open(&path).unwrap();
        let mut content = Vec::new();
        reader
            .open_entry("diamond_sword.png")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"rar blade");

        assert!(matches!(
            reader.open_entry("models").err().unwrap(),
            ArchiveError::EntryNotFound(_)
        ));
    }

    #[test]
    fn test_staging_removed_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = fixture(temp_dir.path(), "textures.rar", TEXTURES_RAR);

        let reader = RarReader::open(&path).unwrap();
        let staging = reader.staging_dir().to_path_buf();
        assert!(staging.join("diamond_sword.png").is_file());

        drop(reader);
        assert!(!staging.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_backslash_names_are_normalized() {
        let temp_dir = TempDir::new().unwrap();
        let path = fixture(temp_dir.path(), "backslash.rar", BACKSLASH_RAR);

        let mut reader = RarReader::open(&path).unwrap();
        assert_eq!(
            reader.entry_names(),
            vec!["assets/items/diamond_sword.png".to_string()]
        );

        let mut content = Vec::new();
        reader
            .open_entry("assets/items/diamond_sword.png")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"rar blade");
    }
}
