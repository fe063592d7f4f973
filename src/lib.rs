// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod extractor;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod store;
pub mod utils;

pub use config::{Config, ExtractionConfig, NotifyConfig, SourceConfig, StoreConfig};
pub use error::{Result, TrackError};
pub use extractor::{CommandExtractor, PlainTextExtractor, TextExtractor};
pub use models::{ChangeEvent, ChangeKind, LogEntry, SourceDocument};
pub use notify::{CommandNotifier, DiffNotifier};
pub use pipeline::{
    CacheGuard, ExtractionProgress, PlannedChange, ReconcileOutcome, Reconciler, RunStats,
    TrackOrchestrator,
};
pub use report::ChangeReport;
pub use source::DocumentScanner;
pub use store::{Changelog, ContentStore, HistoryStore, LatestState, Snapshot, StateLookup};
