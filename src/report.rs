// file: src/report.rs
// description: groups changelog entries by document for review
// reference: read-and-group reporting over the audit trail

use crate::error::{Result, TrackError};
use crate::models::LogEntry;
use crate::store::Changelog;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-document view of the changelog: every message recorded for a stem,
/// in log order. Sorted by stem for stable output.
#[derive(Debug, Serialize)]
pub struct ChangeReport {
    changes: BTreeMap<String, Vec<String>>,
}

impl ChangeReport {
    pub fn from_changelog(changelog: &Changelog) -> Result<Self> {
        Ok(Self::from_entries(changelog.read_entries()?))
    }

    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        let mut changes: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for entry in entries {
            changes.entry(entry.stem).or_default().push(entry.message);
        }
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn render_text(&self) -> String {
        let blocks: Vec<String> = self
            .changes
            .iter()
            .map(|(stem, messages)| {
                let lines: Vec<String> =
                    messages.iter().map(|m| format!("  - {}", m)).collect();
                format!("{}:\n{}", stem, lines.join("\n"))
            })
            .collect();
        blocks.join("\n\n")
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let result = if pretty {
            serde_json::to_string_pretty(&self.changes)
        } else {
            serde_json::to_string(&self.changes)
        };
        result.map_err(|e| TrackError::Serialization(e.to_string()))
    }
}
