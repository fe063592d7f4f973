// file: src/utils/time.rs
// description: sortable UTC run timestamps shared by history and changelog
// reference: https://docs.rs/chrono

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;

/// Lexical sort of formatted timestamps equals chronological order, which
/// the backward history search relies on.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

lazy_static! {
    static ref TIMESTAMP_RE: Regex =
        Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}$").expect("valid timestamp regex");
}

pub fn utc_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn is_valid_timestamp(value: &str) -> bool {
    TIMESTAMP_RE.is_match(value)
}
