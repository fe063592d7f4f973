// file: src/store/content.rs
// description: content store holding the latest extracted text per document
// reference: filesystem-backed key/value layout

use crate::error::{Result, TrackError};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Extracted text lands in the content store as `<stem>.txt`.
pub const CONTENT_EXTENSION: &str = "txt";

/// The directory mapping document stem to its most recently extracted text.
/// Fully replaced on each run: the guard moves the previous files into the
/// cache, then the extractor repopulates the directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    dir: PathBuf,
}

impl ContentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| TrackError::FileOperation {
            path: self.dir.clone(),
            source,
        })
    }

    /// Dots inside a stem are part of the identity; only the trailing
    /// `.txt` is an extension.
    pub fn file_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, CONTENT_EXTENSION))
    }

    pub fn write(&self, stem: &str, text: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.file_for(stem);
        fs::write(&path, text).map_err(|source| TrackError::FileOperation {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Current content files in stem order, for deterministic reconciliation.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|source| TrackError::FileOperation {
            path: self.dir.clone(),
            source,
        })? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }

        files.sort();
        Ok(files)
    }

    pub fn stems(&self) -> Result<BTreeSet<String>> {
        let mut stems = BTreeSet::new();
        for file in self.files()? {
            if let Some(stem) = file.file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_string());
            }
        }
        Ok(stems)
    }
}
