// file: src/store/mod.rs
// description: on-disk store module exports
// reference: internal module structure

pub mod changelog;
pub mod content;
pub mod history;

pub use changelog::Changelog;
pub use content::ContentStore;
pub use history::{HistoryStore, LatestState, Snapshot, StateLookup};
