// file: src/source/scanner.rs
// description: directory walking and source document discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::SourceConfig;
use crate::error::Result;
use crate::models::SourceDocument;
use crate::utils::Validator;
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Finds the tracked source documents: files directly inside the source
/// directory whose name starts with the configured prefix and whose
/// extension matches.
pub struct DocumentScanner {
    config: SourceConfig,
}

impl DocumentScanner {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn scan(&self) -> Result<Vec<SourceDocument>> {
        // a vanished source dir must not read as "every document removed"
        Validator::validate_directory(&self.config.dir)?;

        info!("Scanning source directory: {}", self.config.dir.display());
        let mut documents = Vec::new();

        for entry in WalkDir::new(&self.config.dir)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.matches(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            match SourceDocument::from_path(path) {
                Some(doc) => {
                    // stems flow into tab-separated changelog lines
                    Validator::validate_stem(&doc.stem)?;
                    documents.push(doc);
                }
                None => warn!("Skipping non-UTF-8 file name: {}", path.display()),
            }
        }

        documents.sort_by(|a, b| a.stem.cmp(&b.stem));
        info!("Found {} source documents", documents.len());
        Ok(documents)
    }

    fn matches(&self, path: &Path) -> bool {
        let name_matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&self.config.file_prefix));

        let extension_matches = self.config.extension.is_empty()
            || path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == self.config.extension);

        name_matches && extension_matches
    }
}
