// file: src/extractor/plain.rs
// description: extraction for sources that are already plain text
// reference: internal module structure

use crate::error::{Result, TrackError};
use crate::extractor::TextExtractor;
use std::fs;
use std::path::Path;

/// Reads the source document directly as UTF-8. Used when no converter
/// command is configured, for document sets that are already plain text.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, document: &Path) -> Result<String> {
        fs::read_to_string(document).map_err(|e| TrackError::Extraction {
            path: document.to_path_buf(),
            message: e.to_string(),
        })
    }
}
