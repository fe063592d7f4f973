// file: src/models/entry.rs
// description: changelog entry model with tab-separated line codec
// reference: internal data structures

use crate::error::{Result, TrackError};
use serde::Serialize;

/// One changelog line: stem, sortable timestamp, free-text message, joined
/// by tabs. The companion report tool requires exactly three fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub stem: String,
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(
        stem: impl Into<String>,
        timestamp: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stem: stem.into(),
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }

    pub fn to_line(&self) -> String {
        format!("{}\t{}\t{}", self.stem, self.timestamp, self.message)
    }

    /// Parse a single changelog line. Anything other than exactly three
    /// tab-separated fields fails fast with the offending line number.
    pub fn parse_line(line_no: usize, line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(TrackError::ChangelogParse {
                line: line_no,
                message: format!("expected 3 tab-separated fields, found {}", fields.len()),
            });
        }

        let stem = fields[0].trim();
        if stem.is_empty() {
            return Err(TrackError::ChangelogParse {
                line: line_no,
                message: "empty stem field".to_string(),
            });
        }

        Ok(Self {
            stem: stem.to_string(),
            timestamp: fields[1].trim().to_string(),
            message: fields[2].trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_round_trip() {
        let entry = LogEntry::new("HSE-01", "2025-04-01_12-00-00", "file added");
        let parsed = LogEntry::parse_line(1, &entry.to_line()).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert!(LogEntry::parse_line(1, "only\ttwo").is_err());
        assert!(LogEntry::parse_line(1, "a\tb\tc\td").is_err());
        assert!(LogEntry::parse_line(1, "no tabs at all").is_err());
    }

    #[test]
    fn test_rejects_empty_stem() {
        let err = LogEntry::parse_line(7, "\t2025-04-01_12-00-00\tmsg").unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }
}
