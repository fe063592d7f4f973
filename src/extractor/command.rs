// file: src/extractor/command.rs
// description: extraction via an external converter command
// reference: external process collaborator

use crate::error::{Result, TrackError};
use crate::extractor::TextExtractor;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Runs `command [args..] <document>` and takes the converter's stdout as
/// the document's plain text. Locked, corrupt, or unreadable documents
/// surface here as a nonzero exit or a spawn failure.
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl TextExtractor for CommandExtractor {
    fn extract(&self, document: &Path) -> Result<String> {
        debug!(
            "Extracting {} via '{}'",
            document.display(),
            self.program
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(document)
            .output()
            .map_err(|e| TrackError::Extraction {
                path: document.to_path_buf(),
                message: format!("failed to launch '{}': {}", self.program, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TrackError::Extraction {
                path: document.to_path_buf(),
                message: format!(
                    "'{}' exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| TrackError::Extraction {
            path: document.to_path_buf(),
            message: format!("converter produced non-UTF-8 output: {}", e),
        })
    }
}
