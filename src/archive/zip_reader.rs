use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zip::ZipArchive;
use zip::result::ZipError;

use super::{ArchiveError, ArchiveReader};

pub struct ZipReader {
    inner: ZipArchive<BufReader<File>>,
}

impl ZipReader {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        let inner = ZipArchive::new(BufReader::new(file))?;
        Ok(Self { inner })
    }
}

impl ArchiveReader for ZipReader {
    fn entry_names(&self) -> Vec<String> {
        self.inner.file_names().map(str::to_string).collect()
    }

    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>, ArchiveError> {
        match self.inner.by_name(name) {
            Ok(entry) => Ok(Box::new(entry)),
            Err(ZipError::FileNotFound) => Err(ArchiveError::EntryNotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
