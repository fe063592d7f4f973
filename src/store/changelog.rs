// file: src/store/changelog.rs
// description: append-only tab-separated changelog writer and strict reader
// reference: audit trail, not a source of truth for state reconstruction

use crate::error::{Result, TrackError};
use crate::models::LogEntry;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Changelog {
    path: PathBuf,
}

impl Changelog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry. The log is never rewritten, only appended.
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| TrackError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| TrackError::FileOperation {
                path: self.path.clone(),
                source,
            })?;

        writeln!(file, "{}", entry.to_line()).map_err(|source| TrackError::FileOperation {
            path: self.path.clone(),
            source,
        })?;

        info!("Changelog: {}", entry.to_line());
        Ok(())
    }

    /// Read every entry, failing fast on the first malformed line. A
    /// missing changelog reads as empty.
    pub fn read_entries(&self) -> Result<Vec<LogEntry>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| TrackError::FileOperation {
            path: self.path.clone(),
            source,
        })?;

        let mut entries = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            entries.push(LogEntry::parse_line(idx + 1, line)?);
        }
        Ok(entries)
    }
}
