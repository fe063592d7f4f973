// file: src/pipeline/reconciler.rs
// description: computes change events between current content and history
// reference: diff, notify, and commit phases of a tracking run

use crate::error::{Result, TrackError};
use crate::models::{ChangeEvent, ChangeKind, LogEntry};
use crate::notify::DiffNotifier;
use crate::store::history::{LatestState, StateLookup};
use crate::store::{Changelog, ContentStore, HistoryStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One change the reconciler intends to commit. `current` is the content
/// store file for added/modified stems; `prior` is the latest history file
/// for modified stems.
#[derive(Debug, Clone)]
pub struct PlannedChange {
    pub stem: String,
    pub kind: ChangeKind,
    pub current: Option<PathBuf>,
    pub prior: Option<PathBuf>,
}

impl PlannedChange {
    pub fn event(&self) -> ChangeEvent {
        ChangeEvent::new(self.stem.clone(), self.kind)
    }
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub events: Vec<ChangeEvent>,
    pub snapshot_dir: Option<PathBuf>,
}

/// Compares the freshly extracted content store against the latest state
/// recorded in history. Work is split into three phases so that every
/// notification happens strictly before anything is written: a failed
/// notification aborts a run that has changed nothing yet.
pub struct Reconciler<'a> {
    lookup: &'a dyn StateLookup,
    history: &'a HistoryStore,
    changelog: &'a Changelog,
    notifier: &'a dyn DiffNotifier,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        history: &'a HistoryStore,
        changelog: &'a Changelog,
        notifier: &'a dyn DiffNotifier,
    ) -> Self {
        Self {
            lookup: history,
            history,
            changelog,
            notifier,
        }
    }

    /// Resolve prior state through a substitute lookup (e.g. an index)
    /// while still committing snapshots to `history`.
    pub fn with_lookup(
        lookup: &'a dyn StateLookup,
        history: &'a HistoryStore,
        changelog: &'a Changelog,
        notifier: &'a dyn DiffNotifier,
    ) -> Self {
        Self {
            lookup,
            history,
            changelog,
            notifier,
        }
    }

    /// Diff phase: read-only comparison of current content against the
    /// latest history state. A stem whose latest entry is a tombstone is
    /// treated as nonexistent, so a reappearing document is added, not
    /// modified.
    pub fn plan(&self, content: &ContentStore) -> Result<Vec<PlannedChange>> {
        let mut planned = Vec::new();

        for file in content.files()? {
            let Some(stem) = file.file_stem().and_then(|s| s.to_str()).map(String::from) else {
                continue;
            };

            match self.lookup.latest_state(&stem)? {
                LatestState::Missing | LatestState::Deleted => {
                    debug!("Planned add: {}", stem);
                    planned.push(PlannedChange {
                        stem,
                        kind: ChangeKind::Added,
                        current: Some(file),
                        prior: None,
                    });
                }
                LatestState::Content(prior) => {
                    if !files_identical(&file, &prior)? {
                        debug!("Planned modify: {}", stem);
                        planned.push(PlannedChange {
                            stem,
                            kind: ChangeKind::Modified,
                            current: Some(file),
                            prior: Some(prior),
                        });
                    }
                }
            }
        }

        let current_stems = content.stems()?;
        for stem in self.lookup.live_stems()? {
            if !current_stems.contains(&stem) {
                debug!("Planned remove: {}", stem);
                planned.push(PlannedChange {
                    stem,
                    kind: ChangeKind::Removed,
                    current: None,
                    prior: None,
                });
            }
        }

        Ok(planned)
    }

    /// Run all three phases. Emitted events share one timestamp, one
    /// snapshot directory, and one changelog entry each. Zero events means
    /// no snapshot directory is created and nothing is logged.
    pub fn reconcile(&self, content: &ContentStore, timestamp: &str) -> Result<ReconcileOutcome> {
        let planned = self.plan(content)?;

        if planned.is_empty() {
            info!("No content changes detected");
            return Ok(ReconcileOutcome {
                events: vec![],
                snapshot_dir: None,
            });
        }

        // notify phase, before anything is committed
        for change in &planned {
            if change.kind != ChangeKind::Modified {
                continue;
            }
            let (Some(current), Some(prior)) = (&change.current, &change.prior) else {
                return Err(TrackError::Consistency(format!(
                    "modified stem '{}' planned without both files",
                    change.stem
                )));
            };
            self.notifier.notify(current, prior)?;
        }

        // commit phase
        let snapshot = self.history.snapshot(timestamp)?;
        for change in &planned {
            match change.kind {
                ChangeKind::Added | ChangeKind::Modified => {
                    let current = change.current.as_ref().ok_or_else(|| {
                        TrackError::Consistency(format!(
                            "{} stem '{}' planned without a content file",
                            change.kind, change.stem
                        ))
                    })?;
                    snapshot.record_content(current)?;
                }
                ChangeKind::Removed => {
                    snapshot.record_tombstone(&change.stem)?;
                }
            }

            self.changelog.append(&LogEntry::new(
                change.stem.clone(),
                timestamp,
                change.kind.message(),
            ))?;
            info!("{}: {}", change.kind, change.stem);
        }

        Ok(ReconcileOutcome {
            events: planned.iter().map(PlannedChange::event).collect(),
            snapshot_dir: Some(snapshot.path().to_path_buf()),
        })
    }
}

/// Exact byte comparison, no normalization of whitespace or encoding.
fn files_identical(a: &Path, b: &Path) -> Result<bool> {
    let bytes_a = fs::read(a).map_err(|source| TrackError::FileOperation {
        path: a.to_path_buf(),
        source,
    })?;
    let bytes_b = fs::read(b).map_err(|source| TrackError::FileOperation {
        path: b.to_path_buf(),
        source,
    })?;
    Ok(bytes_a == bytes_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::{FailingNotifier, RecordingNotifier};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        content: ContentStore,
        history: HistoryStore,
        changelog: Changelog,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let content = ContentStore::new(temp.path().join("content"));
        let history = HistoryStore::new(temp.path().join("history"));
        let changelog = Changelog::new(temp.path().join("changelog.txt"));
        content.ensure_dir().unwrap();
        history.ensure_dir().unwrap();
        Fixture {
            _temp: temp,
            content,
            history,
            changelog,
        }
    }

    fn kinds(events: &[ChangeEvent]) -> Vec<(String, ChangeKind)> {
        events
            .iter()
            .map(|e| (e.stem.clone(), e.kind))
            .collect()
    }

    #[test]
    fn test_first_run_adds_everything() {
        // source set {X, Y}, empty history: two adds, one snapshot dir
        let fx = fixture();
        fx.content.write("X", "x body").unwrap();
        fx.content.write("Y", "y body").unwrap();

        let notifier = RecordingNotifier::default();
        let reconciler = Reconciler::new(&fx.history, &fx.changelog, &notifier);
        let outcome = reconciler
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        assert_eq!(
            kinds(&outcome.events),
            vec![
                ("X".to_string(), ChangeKind::Added),
                ("Y".to_string(), ChangeKind::Added),
            ]
        );

        let snapshot_dir = outcome.snapshot_dir.unwrap();
        assert_eq!(fs::read_to_string(snapshot_dir.join("X.txt")).unwrap(), "x body");
        assert_eq!(fs::read_to_string(snapshot_dir.join("Y.txt")).unwrap(), "y body");
        assert_eq!(fx.history.snapshot_dirs().unwrap().len(), 1);
        assert!(notifier.seen.borrow().is_empty());

        let entries = fx.changelog.read_entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "file added");
    }

    #[test]
    fn test_modified_content_notifies_with_new_and_prior() {
        let fx = fixture();
        fx.content.write("X", "v1").unwrap();

        let notifier = RecordingNotifier::default();
        let reconciler = Reconciler::new(&fx.history, &fx.changelog, &notifier);
        reconciler
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        fx.content.write("X", "v2").unwrap();
        let outcome = reconciler
            .reconcile(&fx.content, "2025-04-02_12-00-00")
            .unwrap();

        assert_eq!(kinds(&outcome.events), vec![("X".to_string(), ChangeKind::Modified)]);

        let snapshot_dir = outcome.snapshot_dir.unwrap();
        assert_eq!(fs::read_to_string(snapshot_dir.join("X.txt")).unwrap(), "v2");

        let seen = notifier.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(fs::read_to_string(&seen[0].0).unwrap(), "v2");
        assert_eq!(fs::read_to_string(&seen[0].1).unwrap(), "v1");
    }

    #[test]
    fn test_identical_content_emits_nothing() {
        let fx = fixture();
        fx.content.write("X", "same").unwrap();

        let notifier = RecordingNotifier::default();
        let reconciler = Reconciler::new(&fx.history, &fx.changelog, &notifier);
        reconciler
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        let outcome = reconciler
            .reconcile(&fx.content, "2025-04-02_12-00-00")
            .unwrap();

        assert!(outcome.events.is_empty());
        assert!(outcome.snapshot_dir.is_none());
        assert_eq!(fx.history.snapshot_dirs().unwrap().len(), 1);
        assert_eq!(fx.changelog.read_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_stem_is_removed_with_tombstone() {
        let fx = fixture();
        fx.content.write("X", "x").unwrap();
        fx.content.write("Y", "y").unwrap();

        let notifier = RecordingNotifier::default();
        let reconciler = Reconciler::new(&fx.history, &fx.changelog, &notifier);
        reconciler
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        fs::remove_file(fx.content.file_for("Y")).unwrap();
        let outcome = reconciler
            .reconcile(&fx.content, "2025-04-02_12-00-00")
            .unwrap();

        assert_eq!(kinds(&outcome.events), vec![("Y".to_string(), ChangeKind::Removed)]);
        let snapshot_dir = outcome.snapshot_dir.unwrap();
        assert!(snapshot_dir.join("Y.deleted").exists());
        assert_eq!(fx.history.latest_state("Y").unwrap(), LatestState::Deleted);
    }

    #[test]
    fn test_reappearing_after_tombstone_is_added() {
        // latest entry for Y is a tombstone: reappearance is an add
        let fx = fixture();
        fx.content.write("Y", "v1").unwrap();

        let notifier = RecordingNotifier::default();
        let reconciler = Reconciler::new(&fx.history, &fx.changelog, &notifier);
        reconciler
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        fs::remove_file(fx.content.file_for("Y")).unwrap();
        reconciler
            .reconcile(&fx.content, "2025-04-02_12-00-00")
            .unwrap();

        fx.content.write("Y", "v2").unwrap();
        let outcome = reconciler
            .reconcile(&fx.content, "2025-04-03_12-00-00")
            .unwrap();

        assert_eq!(kinds(&outcome.events), vec![("Y".to_string(), ChangeKind::Added)]);
        assert!(notifier.seen.borrow().is_empty());
    }

    #[test]
    fn test_notification_failure_aborts_before_commit() {
        let fx = fixture();
        fx.content.write("X", "v1").unwrap();

        let ok_notifier = RecordingNotifier::default();
        Reconciler::new(&fx.history, &fx.changelog, &ok_notifier)
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        fx.content.write("X", "v2").unwrap();
        let err = Reconciler::new(&fx.history, &fx.changelog, &FailingNotifier)
            .reconcile(&fx.content, "2025-04-02_12-00-00")
            .unwrap_err();

        assert!(matches!(err, TrackError::Notification { .. }), "{:?}", err);
        // nothing committed: one snapshot, one changelog entry from the first run
        assert_eq!(fx.history.snapshot_dirs().unwrap().len(), 1);
        assert_eq!(fx.changelog.read_entries().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupted_history_fails_lookup() {
        // two files for stem A within one snapshot directory
        let fx = fixture();
        let dir = fx.history.dir().join("content_2025-04-01_00-00-00");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("A.txt"), "a").unwrap();
        fs::write(dir.join("A.deleted"), "").unwrap();

        fx.content.write("A", "a").unwrap();

        let notifier = RecordingNotifier::default();
        let err = Reconciler::new(&fx.history, &fx.changelog, &notifier)
            .plan(&fx.content)
            .unwrap_err();
        assert!(matches!(err, TrackError::Consistency(_)), "{:?}", err);
    }

    #[test]
    fn test_substitute_lookup_drives_planning() {
        struct EmptyLookup;
        impl StateLookup for EmptyLookup {
            fn latest_state(&self, _stem: &str) -> crate::error::Result<LatestState> {
                Ok(LatestState::Missing)
            }
            fn live_stems(&self) -> crate::error::Result<std::collections::BTreeSet<String>> {
                Ok(Default::default())
            }
        }

        let fx = fixture();
        fx.content.write("X", "x").unwrap();

        let notifier = RecordingNotifier::default();
        Reconciler::new(&fx.history, &fx.changelog, &notifier)
            .reconcile(&fx.content, "2025-04-01_12-00-00")
            .unwrap();

        // the default lookup now sees X as unchanged; a substitute lookup
        // decides planning on its own
        let planned = Reconciler::with_lookup(&EmptyLookup, &fx.history, &fx.changelog, &notifier)
            .plan(&fx.content)
            .unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, ChangeKind::Added);
    }

    #[test]
    fn test_byte_comparison_is_exact() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.txt");
        let b = temp.path().join("b.txt");
        fs::write(&a, "line\n").unwrap();
        fs::write(&b, "line\r\n").unwrap();

        assert!(!files_identical(&a, &b).unwrap());
        fs::write(&b, "line\n").unwrap();
        assert!(files_identical(&a, &b).unwrap());
    }
}
