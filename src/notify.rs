// file: src/notify.rs
// description: external diff viewer invocation for manual change review
// reference: external process collaborator

use crate::error::{Result, TrackError};
use crate::utils::Validator;
use std::path::Path;
use std::process::Command;
use tracing::info;

/// Blocking notification that a document changed, pointing an external
/// viewer at the new and prior text files. Failure is surfaced, never
/// swallowed.
pub trait DiffNotifier {
    fn notify(&self, new_file: &Path, old_file: &Path) -> Result<()>;
}

/// Launches the configured diff viewer (reference setup: `gvim -d`) and
/// treats a nonzero exit as a hard error.
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl DiffNotifier for CommandNotifier {
    fn notify(&self, new_file: &Path, old_file: &Path) -> Result<()> {
        let stem = new_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("?")
            .to_string();

        Validator::validate_file_exists(new_file).map_err(|e| TrackError::Notification {
            stem: stem.clone(),
            message: e.to_string(),
        })?;
        Validator::validate_file_exists(old_file).map_err(|e| TrackError::Notification {
            stem: stem.clone(),
            message: e.to_string(),
        })?;

        info!(
            "Opening diff viewer for {} against {}",
            new_file.display(),
            old_file.display()
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(new_file)
            .arg(old_file)
            .status()
            .map_err(|e| TrackError::Notification {
                stem: stem.clone(),
                message: format!("failed to launch '{}': {}", self.program, e),
            })?;

        if !status.success() {
            return Err(TrackError::Notification {
                stem,
                message: format!("'{}' exited with {}", self.program, status),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records invocations instead of launching a viewer.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub seen: RefCell<Vec<(PathBuf, PathBuf)>>,
    }

    impl DiffNotifier for RecordingNotifier {
        fn notify(&self, new_file: &Path, old_file: &Path) -> Result<()> {
            self.seen
                .borrow_mut()
                .push((new_file.to_path_buf(), old_file.to_path_buf()));
            Ok(())
        }
    }

    /// Fails every notification, for abort-path tests.
    pub struct FailingNotifier;

    impl DiffNotifier for FailingNotifier {
        fn notify(&self, new_file: &Path, _old_file: &Path) -> Result<()> {
            Err(TrackError::Notification {
                stem: new_file
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("?")
                    .to_string(),
                message: "viewer unavailable".to_string(),
            })
        }
    }
}
