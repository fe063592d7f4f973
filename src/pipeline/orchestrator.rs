// file: src/pipeline/orchestrator.rs
// description: coordinates caching, extraction, reconciliation, and rollback
// reference: single-run batch workflow over the on-disk stores

use crate::config::Config;
use crate::error::{Result, TrackError};
use crate::extractor::{self, TextExtractor};
use crate::models::{ChangeKind, SourceDocument};
use crate::notify::{CommandNotifier, DiffNotifier};
use crate::pipeline::guard::CacheGuard;
use crate::pipeline::progress::{ExtractionProgress, RunStats};
use crate::pipeline::reconciler::{PlannedChange, Reconciler};
use crate::source::DocumentScanner;
use crate::store::{Changelog, ContentStore, HistoryStore};
use crate::utils::time::utc_timestamp;
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives one run through its states: cache the old content, extract the
/// new, then either reconcile and commit or roll back. A run either
/// commits a full set of changelog/history updates or leaves every store
/// untouched.
///
/// Single-writer by assumption: nothing here defends against two runs
/// executing concurrently over the same stores.
pub struct TrackOrchestrator {
    scanner: DocumentScanner,
    extractor: Box<dyn TextExtractor>,
    notifier: Box<dyn DiffNotifier>,
    content: ContentStore,
    history: HistoryStore,
    changelog: Changelog,
    guard: CacheGuard,
}

impl TrackOrchestrator {
    pub fn new(config: Config) -> Self {
        let extractor = extractor::from_config(&config.extraction);
        let notifier = Box::new(CommandNotifier::new(
            config.notify.command.clone(),
            config.notify.args.clone(),
        ));
        Self::with_collaborators(config, extractor, notifier)
    }

    /// Constructor with injectable collaborators at the two external seams.
    pub fn with_collaborators(
        config: Config,
        extractor: Box<dyn TextExtractor>,
        notifier: Box<dyn DiffNotifier>,
    ) -> Self {
        Self {
            scanner: DocumentScanner::new(config.source.clone()),
            extractor,
            notifier,
            content: ContentStore::new(config.stores.content_dir.clone()),
            history: HistoryStore::new(config.stores.history_dir.clone()),
            changelog: Changelog::new(config.stores.changelog.clone()),
            guard: CacheGuard::new(
                config.stores.content_dir.clone(),
                config.stores.cache_dir.clone(),
            ),
        }
    }

    /// The full tracking run.
    pub fn run(&self) -> Result<RunStats> {
        let start_time = Instant::now();
        let documents = self.prepare()?;

        self.guard.begin()?;

        if let Err(err) = self.extract_all(&documents) {
            error!("Extraction failed; restoring previous state");
            self.guard.rollback()?;
            return Err(err);
        }

        let timestamp = utc_timestamp();
        let reconciler = Reconciler::new(&self.history, &self.changelog, self.notifier.as_ref());
        let outcome = match reconciler.reconcile(&self.content, &timestamp) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("Reconciliation failed; restoring previous state");
                self.guard.rollback()?;
                return Err(err);
            }
        };

        self.guard.commit()?;

        let mut stats = RunStats::new();
        stats.documents_extracted = documents.len();
        for event in &outcome.events {
            match event.kind {
                ChangeKind::Added => stats.added += 1,
                ChangeKind::Modified => stats.modified += 1,
                ChangeKind::Removed => stats.removed += 1,
            }
        }
        stats.duration_secs = start_time.elapsed().as_secs();

        self.log_final_stats(&stats);
        Ok(stats)
    }

    /// Extract and diff without touching history, changelog, or notifier.
    /// The prior content store state is restored before returning.
    pub fn dry_run(&self) -> Result<Vec<PlannedChange>> {
        let documents = self.prepare()?;

        self.guard.begin()?;

        if let Err(err) = self.extract_all(&documents) {
            error!("Extraction failed; restoring previous state");
            self.guard.rollback()?;
            return Err(err);
        }

        let reconciler = Reconciler::new(&self.history, &self.changelog, self.notifier.as_ref());
        let planned = reconciler.plan(&self.content);

        self.guard.rollback()?;
        planned
    }

    /// Restore a cache left behind by an interrupted run.
    pub fn recover(&self) -> Result<bool> {
        self.guard.recover()
    }

    /// Remove empty snapshot directories from history.
    pub fn prune(&self) -> Result<usize> {
        self.history.prune_empty()
    }

    fn prepare(&self) -> Result<Vec<SourceDocument>> {
        self.content.ensure_dir()?;
        self.history.ensure_dir()?;

        let pruned = self.history.prune_empty()?;
        if pruned > 0 {
            info!("Pruned {} empty snapshot directories", pruned);
        }

        let documents = self.scanner.scan()?;
        if documents.is_empty() {
            warn!("No source documents matched; every tracked document will be marked removed");
        }
        Ok(documents)
    }

    /// Extract every document, collecting one explicit result per document.
    /// All-or-nothing: any failure fails the batch.
    fn extract_all(&self, documents: &[SourceDocument]) -> Result<()> {
        let progress = ExtractionProgress::new(documents.len());
        let mut first_failure: Option<TrackError> = None;

        for document in documents {
            progress.start_document(&document.stem);
            let result = extractor::extract_to_store(
                self.extractor.as_ref(),
                &self.content,
                document,
            );
            progress.document_done();

            if let Err(err) = result {
                error!("Failed to extract {}: {}", document.stem, err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
        progress.finish();

        match first_failure {
            Some(err) => Err(err),
            None => {
                info!("Extracted {} documents", documents.len());
                Ok(())
            }
        }
    }

    fn log_final_stats(&self, stats: &RunStats) {
        info!("=== Run Summary ===");
        info!("Duration: {} seconds", stats.duration_secs);
        info!("Documents extracted: {}", stats.documents_extracted);
        info!("Added: {}", stats.added);
        info!("Modified: {}", stats.modified);
        info!("Removed: {}", stats.removed);
        info!("===================");
    }
}
