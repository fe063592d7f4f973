// file: src/utils/validation.rs
// description: data validation utilities and helpers
// reference: input validation patterns

use crate::error::{Result, TrackError};
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(TrackError::Validation(format!(
                "Directory does not exist: {}",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(TrackError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    pub fn validate_file_exists(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(TrackError::Validation(format!(
                "File not found: {}",
                path.display()
            )));
        }
        Ok(())
    }

    pub fn validate_stem(stem: &str) -> Result<()> {
        if stem.trim().is_empty() {
            return Err(TrackError::Validation("Stem is empty".to_string()));
        }

        if stem.contains('\t') || stem.contains('\n') {
            return Err(TrackError::Validation(format!(
                "Stem contains reserved whitespace: {:?}",
                stem
            )));
        }

        if stem.contains('/') || stem.contains('\\') {
            return Err(TrackError::Validation(format!(
                "Stem contains a path separator: {:?}",
                stem
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(Validator::validate_directory(Path::new("/nonexistent")).is_err());
    }

    #[test]
    fn test_validate_file_exists() {
        let temp = TempDir::new().unwrap();
        let file_path = temp.path().join("doc.txt");
        fs::write(&file_path, "text").unwrap();

        assert!(Validator::validate_file_exists(&file_path).is_ok());
        assert!(Validator::validate_file_exists(&temp.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_validate_stem() {
        assert!(Validator::validate_stem("HSE-01 Intro").is_ok());
        assert!(Validator::validate_stem("").is_err());
        assert!(Validator::validate_stem("  ").is_err());
        assert!(Validator::validate_stem("a\tb").is_err());
        assert!(Validator::validate_stem("a/b").is_err());
    }
}
