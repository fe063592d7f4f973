// file: src/models/event.rs
// description: change event types emitted by the reconciler
// reference: internal data structures

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Free-text message recorded in the changelog for this kind of change.
    pub fn message(&self) -> &'static str {
        match self {
            ChangeKind::Added => "file added",
            ChangeKind::Modified => "file modified",
            ChangeKind::Removed => "file removed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Removed => "removed",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub stem: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(stem: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            stem: stem.into(),
            kind,
        }
    }
}
