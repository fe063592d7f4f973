// file: src/store/history.rs
// description: append-only history of timestamped snapshot directories
// reference: backward search over lexically sorted snapshot names

use crate::error::{Result, TrackError};
use crate::utils::time::is_valid_timestamp;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const SNAPSHOT_PREFIX: &str = "content_";

/// Reserved marker extension recording "deleted as of this snapshot".
/// Config validation keeps it from colliding with the source extension.
pub const TOMBSTONE_EXTENSION: &str = "deleted";

lazy_static! {
    static ref SNAPSHOT_NAME_RE: Regex =
        Regex::new(r"^content_(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})$")
            .expect("valid snapshot name regex");
}

/// Latest known state of a stem, resolved by searching history backward.
/// `Deleted` (latest entry is a tombstone) is distinct from `Missing`
/// (no entry in any snapshot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestState {
    Content(PathBuf),
    Deleted,
    Missing,
}

/// Read interface for resolving prior state. The backward directory scan
/// is O(history depth) per stem; an index keeping a stem-to-directory map
/// can stand in behind this trait without touching the reconciler.
pub trait StateLookup {
    fn latest_state(&self, stem: &str) -> Result<LatestState>;
    fn live_stems(&self) -> Result<BTreeSet<String>>;
}

impl StateLookup for HistoryStore {
    fn latest_state(&self, stem: &str) -> Result<LatestState> {
        HistoryStore::latest_state(self, stem)
    }

    fn live_stems(&self) -> Result<BTreeSet<String>> {
        HistoryStore::live_stems(self)
    }
}

/// The append-only store of snapshot directories. Each directory holds only
/// the files that changed at that timestamp; the latest state of an
/// unchanged stem is found by searching backward. Directories are never
/// mutated after a run commits, and removed only when empty.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
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

    /// Snapshot directories sorted ascending by name. Name format makes
    /// lexical order equal chronological order; anything else in the
    /// history dir is ignored.
    pub fn snapshot_dirs(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(vec![]);
        }

        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|source| TrackError::FileOperation {
            path: self.dir.clone(),
            source,
        })? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if SNAPSHOT_NAME_RE.is_match(name) {
                dirs.push(entry.path());
            } else {
                debug!("Ignoring non-snapshot entry in history: {}", name);
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    /// Find the single file for `stem` in one snapshot directory. Two
    /// matches means corrupted history and fails rather than picking one.
    fn find_stem(dir: &Path, stem: &str) -> Result<Option<PathBuf>> {
        let mut found: Option<PathBuf> = None;
        for entry in fs::read_dir(dir).map_err(|source| TrackError::FileOperation {
            path: dir.to_path_buf(),
            source,
        })? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|s| s == stem);
            if !matches {
                continue;
            }
            if let Some(previous) = &found {
                return Err(TrackError::Consistency(format!(
                    "multiple entries for stem '{}' in {}: {} and {}",
                    stem,
                    dir.display(),
                    previous.display(),
                    path.display()
                )));
            }
            found = Some(path);
        }
        Ok(found)
    }

    /// Search backward through history for the latest entry for `stem`.
    pub fn latest_state(&self, stem: &str) -> Result<LatestState> {
        for dir in self.snapshot_dirs()?.iter().rev() {
            match Self::find_stem(dir, stem)? {
                None => continue,
                Some(path) => {
                    let is_tombstone = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e == TOMBSTONE_EXTENSION);
                    return Ok(if is_tombstone {
                        LatestState::Deleted
                    } else {
                        LatestState::Content(path)
                    });
                }
            }
        }
        Ok(LatestState::Missing)
    }

    /// Every stem that appears anywhere in history, tombstones included.
    pub fn collect_stems(&self) -> Result<BTreeSet<String>> {
        let mut stems = BTreeSet::new();
        for dir in self.snapshot_dirs()? {
            for entry in fs::read_dir(&dir).map_err(|source| TrackError::FileOperation {
                path: dir.clone(),
                source,
            })? {
                let entry = entry?;
                if !entry.file_type()?.is_file() {
                    continue;
                }
                if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                    stems.insert(stem.to_string());
                }
            }
        }
        Ok(stems)
    }

    /// Stems whose latest state is content, i.e. the set of documents that
    /// should currently exist. A stem that appears in history but resolves
    /// to no state at all indicates corruption and fails loudly.
    pub fn live_stems(&self) -> Result<BTreeSet<String>> {
        let mut live = BTreeSet::new();
        for stem in self.collect_stems()? {
            match self.latest_state(&stem)? {
                LatestState::Content(_) => {
                    live.insert(stem);
                }
                LatestState::Deleted => {}
                LatestState::Missing => {
                    return Err(TrackError::Consistency(format!(
                        "stem '{}' is present in history but has no resolvable state",
                        stem
                    )));
                }
            }
        }
        Ok(live)
    }

    /// Remove snapshot directories containing zero files. Runs as an
    /// explicit step before reconciliation so stale empty markers cannot
    /// distort latest-state lookups. Non-empty directories are never
    /// touched, regardless of age.
    pub fn prune_empty(&self) -> Result<usize> {
        let mut removed = 0;
        for dir in self.snapshot_dirs()? {
            let mut entries = fs::read_dir(&dir).map_err(|source| TrackError::FileOperation {
                path: dir.clone(),
                source,
            })?;
            if entries.next().is_none() {
                info!("Pruning empty snapshot directory: {}", dir.display());
                fs::remove_dir(&dir).map_err(|source| TrackError::FileOperation {
                    path: dir.clone(),
                    source,
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Writer for this run's snapshot directory.
    pub fn snapshot(&self, timestamp: &str) -> Result<Snapshot> {
        if !is_valid_timestamp(timestamp) {
            return Err(TrackError::Validation(format!(
                "Invalid snapshot timestamp: {}",
                timestamp
            )));
        }
        Ok(Snapshot {
            dir: self.dir.join(format!("{}{}", SNAPSHOT_PREFIX, timestamp)),
        })
    }
}

/// One run's snapshot directory. The directory is created lazily on the
/// first recorded artifact, so a run with zero change events never leaves
/// an empty history entry behind.
#[derive(Debug)]
pub struct Snapshot {
    dir: PathBuf,
}

impl Snapshot {
    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| TrackError::FileOperation {
            path: self.dir.clone(),
            source,
        })
    }

    /// Copy a current content file into the snapshot under its own name.
    pub fn record_content(&self, src: &Path) -> Result<PathBuf> {
        let name = src.file_name().ok_or_else(|| {
            TrackError::Validation(format!("Content path has no file name: {}", src.display()))
        })?;
        self.ensure_dir()?;
        let dest = self.dir.join(name);
        fs::copy(src, &dest).map_err(|source| TrackError::FileOperation {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    /// Record that `stem` was deleted as of this snapshot.
    pub fn record_tombstone(&self, stem: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let dest = self.dir.join(format!("{}.{}", stem, TOMBSTONE_EXTENSION));
        fs::write(&dest, b"").map_err(|source| TrackError::FileOperation {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }
}
