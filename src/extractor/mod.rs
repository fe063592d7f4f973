// file: src/extractor/mod.rs
// description: document-to-text extraction module exports
// reference: internal module structure

pub mod command;
pub mod plain;

pub use command::CommandExtractor;
pub use plain::PlainTextExtractor;

use crate::config::ExtractionConfig;
use crate::error::Result;
use crate::models::SourceDocument;
use crate::store::ContentStore;
use std::path::Path;

/// Opaque document-to-text conversion. One call per document, no retries;
/// a failure is fatal to the run's commit and handled by the rollback
/// guard.
pub trait TextExtractor {
    fn extract(&self, document: &Path) -> Result<String>;
}

/// Build the extractor selected by configuration: an external converter
/// command when one is set, plain UTF-8 reads otherwise.
pub fn from_config(config: &ExtractionConfig) -> Box<dyn TextExtractor> {
    match &config.command {
        Some(command) => Box::new(CommandExtractor::new(command.clone(), config.args.clone())),
        None => Box::new(PlainTextExtractor),
    }
}

/// Extract one document and write its text into the content store under
/// the document's stem.
pub fn extract_to_store(
    extractor: &dyn TextExtractor,
    content: &ContentStore,
    document: &SourceDocument,
) -> Result<()> {
    let text = extractor.extract(&document.path)?;
    content.write(&document.stem, &text)?;
    Ok(())
}
