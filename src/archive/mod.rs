//! Uniform read access to the archive formats found in resource-pack dumps

mod rar_reader;
mod zip_reader;

use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

pub use rar_reader::RarReader;
pub use zip_reader::ZipReader;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("RAR error: {0}")]
    Rar(String),

    #[error("Entry not found in archive: {0}")]
    EntryNotFound(String),
}

/// Read side of an archive, independent of its container format.
pub trait ArchiveReader {
    /// Entry names in listing order, `/`-separated.
    fn entry_names(&self) -> Vec<String>;

    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>, ArchiveError>;
}

/// Supported archive container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
}

impl ArchiveKind {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("zip") {
            Some(Self::Zip)
        } else if ext.eq_ignore_ascii_case("rar") {
            Some(Self::Rar)
        } else {
            None
        }
    }

    pub fn open(self, path: &Path) -> Result<Box<dyn ArchiveReader>, ArchiveError> {
        match self {
            Self::Zip => Ok(Box::new(ZipReader::open(path)?)),
            Self::Rar => Ok(Box::new(RarReader::open(path)?)),
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveKind::Zip => write!(f, "ZIP"),
            ArchiveKind::Rar => write!(f, "RAR"),
        }
    }
}
