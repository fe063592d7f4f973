// file: src/pipeline/guard.rs
// description: cache/rollback guard protecting the content store across extraction
// reference: move-aside cache with restore on failure

use crate::error::{Result, TrackError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Moves the content store aside before extraction and restores it if the
/// run fails. The content store is only ever left as "this run's complete
/// extraction" or "the prior complete extraction", never a partial mix.
/// The cache lives for a single run; `recover` handles the one left behind
/// by an interrupted process.
#[derive(Debug, Clone)]
pub struct CacheGuard {
    content_dir: PathBuf,
    cache_dir: PathBuf,
}

impl CacheGuard {
    pub fn new(content_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_exists(&self) -> bool {
        self.cache_dir.exists()
    }

    /// Move every current content file into a fresh cache. Refuses to run
    /// while a cache from an interrupted run exists; that cache holds the
    /// only copy of the prior state.
    pub fn begin(&self) -> Result<()> {
        if self.cache_exists() {
            return Err(TrackError::Validation(format!(
                "a cache from an earlier run exists at {}; run 'recover' first or remove it",
                self.cache_dir.display()
            )));
        }

        fs::create_dir_all(&self.cache_dir).map_err(|source| TrackError::FileOperation {
            path: self.cache_dir.clone(),
            source,
        })?;
        fs::create_dir_all(&self.content_dir).map_err(|source| TrackError::FileOperation {
            path: self.content_dir.clone(),
            source,
        })?;

        let moved = move_files(&self.content_dir, &self.cache_dir)?;
        info!("Cached {} content files", moved);
        Ok(())
    }

    /// Discard any partial extraction output and put the cached files back.
    pub fn rollback(&self) -> Result<()> {
        if !self.cache_exists() {
            return Err(TrackError::Validation(format!(
                "no cache to roll back at {}",
                self.cache_dir.display()
            )));
        }

        fs::create_dir_all(&self.content_dir).map_err(|source| TrackError::FileOperation {
            path: self.content_dir.clone(),
            source,
        })?;
        remove_files(&self.content_dir)?;
        let restored = move_files(&self.cache_dir, &self.content_dir)?;
        fs::remove_dir(&self.cache_dir).map_err(|source| TrackError::FileOperation {
            path: self.cache_dir.clone(),
            source,
        })?;
        info!("Restored {} content files from cache", restored);
        Ok(())
    }

    /// The run committed; the prior state lives in history now.
    pub fn commit(&self) -> Result<()> {
        if self.cache_exists() {
            fs::remove_dir_all(&self.cache_dir).map_err(|source| TrackError::FileOperation {
                path: self.cache_dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Explicit recovery for a cache left behind by an interrupted run.
    /// Returns whether anything was restored.
    pub fn recover(&self) -> Result<bool> {
        if !self.cache_exists() {
            info!("No cache present at {}", self.cache_dir.display());
            return Ok(false);
        }

        warn!(
            "Recovering interrupted run: restoring cache {} into {}",
            self.cache_dir.display(),
            self.content_dir.display()
        );
        self.rollback()?;
        Ok(true)
    }
}

fn move_files(from: &Path, to: &Path) -> Result<usize> {
    let mut moved = 0;
    for entry in fs::read_dir(from).map_err(|source| TrackError::FileOperation {
        path: from.to_path_buf(),
        source,
    })? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let dest = to.join(entry.file_name());
        fs::rename(entry.path(), &dest).map_err(|source| TrackError::FileOperation {
            path: dest.clone(),
            source,
        })?;
        moved += 1;
    }
    Ok(moved)
}

fn remove_files(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir).map_err(|source| TrackError::FileOperation {
        path: dir.to_path_buf(),
        source,
    })? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path()).map_err(|source| TrackError::FileOperation {
                path: entry.path(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn dir_contents(dir: &Path) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        if !dir.exists() {
            return map;
        }
        for entry in fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_file() {
                map.insert(
                    entry.file_name().to_string_lossy().to_string(),
                    fs::read_to_string(entry.path()).unwrap(),
                );
            }
        }
        map
    }

    #[test]
    fn test_begin_empties_content_into_cache() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let cache = temp.path().join("cache");
        fs::create_dir(&content).unwrap();
        fs::write(content.join("A.txt"), "a").unwrap();

        let guard = CacheGuard::new(&content, &cache);
        guard.begin().unwrap();

        assert!(dir_contents(&content).is_empty());
        assert_eq!(dir_contents(&cache).get("A.txt").unwrap(), "a");
    }

    #[test]
    fn test_rollback_restores_byte_identical_state() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let cache = temp.path().join("cache");
        fs::create_dir(&content).unwrap();
        fs::write(content.join("A.txt"), "a v1").unwrap();
        fs::write(content.join("B.txt"), "b v1").unwrap();
        let before = dir_contents(&content);

        let guard = CacheGuard::new(&content, &cache);
        guard.begin().unwrap();
        // partial extraction output
        fs::write(content.join("A.txt"), "a v2").unwrap();

        guard.rollback().unwrap();

        assert_eq!(dir_contents(&content), before);
        assert!(!guard.cache_exists());
    }

    #[test]
    fn test_commit_deletes_cache() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let cache = temp.path().join("cache");
        fs::create_dir(&content).unwrap();
        fs::write(content.join("A.txt"), "a").unwrap();

        let guard = CacheGuard::new(&content, &cache);
        guard.begin().unwrap();
        guard.commit().unwrap();

        assert!(!guard.cache_exists());
    }

    #[test]
    fn test_begin_refuses_stale_cache() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let cache = temp.path().join("cache");
        fs::create_dir(&content).unwrap();
        fs::create_dir(&cache).unwrap();

        let guard = CacheGuard::new(&content, &cache);
        assert!(guard.begin().is_err());
    }

    #[test]
    fn test_recover_restores_stale_cache() {
        let temp = TempDir::new().unwrap();
        let content = temp.path().join("content");
        let cache = temp.path().join("cache");
        fs::create_dir(&content).unwrap();
        fs::create_dir(&cache).unwrap();
        fs::write(cache.join("A.txt"), "cached").unwrap();

        let guard = CacheGuard::new(&content, &cache);
        assert!(guard.recover().unwrap());
        assert_eq!(dir_contents(&content).get("A.txt").unwrap(), "cached");

        // nothing left to recover on a second call
        assert!(!guard.recover().unwrap());
    }
}
