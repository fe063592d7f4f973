// file: src/pipeline/progress.rs
// description: progress reporting and statistics for a tracking run
// reference: uses indicatif for the extraction progress bar

use indicatif::{ProgressBar, ProgressStyle};

#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub documents_extracted: usize,
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub duration_secs: u64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_changes(&self) -> usize {
        self.added + self.modified + self.removed
    }

    pub fn documents_per_second(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        self.documents_extracted as f64 / self.duration_secs as f64
    }
}

pub struct ExtractionProgress {
    bar: ProgressBar,
}

impl ExtractionProgress {
    pub fn new(total_documents: usize) -> Self {
        Self::with_color(total_documents, true)
    }

    pub fn with_color(total_documents: usize, colored: bool) -> Self {
        let bar = ProgressBar::new(total_documents as u64);
        let template = if colored {
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}"
        } else {
            "{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template(template)
                .expect("Failed to create progress bar template")
                .progress_chars(if colored { "█▓▒░" } else { "=>-" }),
        );
        Self { bar }
    }

    pub fn start_document(&self, stem: &str) {
        self.bar.set_message(format!("extracting {}", stem));
    }

    pub fn document_done(&self) {
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("extraction complete");
    }
}
