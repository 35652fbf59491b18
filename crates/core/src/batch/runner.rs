//! Batch orchestrator implementation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::catalog::{Episode, Quality, Show, ShowDirectory};
use crate::ledger::{compute_new, DownloadRecord, LedgerStore};
use crate::metrics;
use crate::opener::MagnetOpener;
use crate::pagination::{Collection, FetchMode, PaginationCoordinator};

use super::types::{BatchError, BatchReport, ShowError, ShowOutcome, NO_NEW_RELEASES};

/// Runs the check-and-emit cycle over every tracked show.
pub struct BatchOrchestrator {
    directory: Arc<dyn ShowDirectory>,
    coordinator: PaginationCoordinator,
    ledger: Arc<dyn LedgerStore>,
    mode: FetchMode,
    dry_run: bool,
}

impl BatchOrchestrator {
    /// Create an orchestrator that walks release indexes linearly.
    pub fn new(
        directory: Arc<dyn ShowDirectory>,
        coordinator: PaginationCoordinator,
        ledger: Arc<dyn LedgerStore>,
    ) -> Self {
        Self {
            directory,
            coordinator,
            ledger,
            mode: FetchMode::Linear,
            dry_run: false,
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    /// Report new episodes without writing the ledger, so a later run still
    /// sees them as new.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resolve a show's catalog id and collect its episodes at `quality`.
    pub async fn check_show(&self, show: &Show, quality: Quality) -> Result<Collection, ShowError> {
        let show_id = self
            .directory
            .resolve_show_id(show)
            .await
            .map_err(ShowError::Resolve)?;
        debug!(show = %show.title, show_id = %show_id, "Resolved show id");

        Ok(self
            .coordinator
            .collect_episodes(show, &show_id, quality, self.mode)
            .await?)
    }

    /// Check every tracked show and return the episodes not seen before.
    ///
    /// Shows are processed one at a time. A show that fails is reported and
    /// skipped; its ledger entry is left as it was. The ledger is written once,
    /// after every show has been checked, and a write failure fails the run.
    /// Dry runs skip the write.
    pub async fn run(&self, tracked: &[Show], quality: Quality) -> Result<BatchReport, BatchError> {
        let started_at = Utc::now();
        let mut notices = Vec::new();
        let mut emitted = Vec::new();
        let mut shows = Vec::new();

        info!(shows = tracked.len(), quality = %quality, mode = ?self.mode, "Starting batch run");

        let mut record = match self.ledger.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Download ledger unreadable, starting from an empty history");
                notices.push(format!(
                    "download ledger could not be read ({}); every listed episode counts as new",
                    e
                ));
                DownloadRecord::new()
            }
        };

        let mut processed = HashSet::new();
        for show in tracked {
            if !processed.insert(show.title.as_str()) {
                debug!(show = %show.title, "Skipping duplicate tracked show");
                continue;
            }

            match self.check_show(show, quality).await {
                Ok(collection) => {
                    for warning in &collection.warnings {
                        notices.push(format!("{}: {}", show.title, warning));
                    }
                    if collection.skipped_entries > 0 {
                        notices.push(format!(
                            "{}: {} releases not available in {}",
                            show.title, collection.skipped_entries, quality
                        ));
                    }

                    let new = compute_new(&show.title, &collection.episodes, &record);
                    record.record(
                        &show.title,
                        collection.episodes.iter().map(|e| e.key().clone()),
                    );

                    info!(
                        show = %show.title,
                        seen = collection.episodes.len(),
                        new = new.len(),
                        "Checked show"
                    );
                    metrics::SHOWS_PROCESSED.with_label_values(&["checked"]).inc();
                    shows.push(ShowOutcome::Checked {
                        title: show.title.clone(),
                        seen: collection.episodes.len(),
                        new: new.len(),
                    });
                    emitted.extend(new);
                }
                Err(e) => {
                    warn!(show = %show.title, error = %e, "Show check failed");
                    metrics::SHOWS_PROCESSED.with_label_values(&["failed"]).inc();
                    notices.push(format!("{}: {}", show.title, e));
                    shows.push(ShowOutcome::Failed {
                        title: show.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if self.dry_run {
            debug!("Dry run, ledger left untouched");
        } else {
            self.ledger.save(&record).map_err(BatchError::LedgerPersist)?;
        }

        if emitted.is_empty() {
            notices.push(NO_NEW_RELEASES.to_string());
        }
        metrics::EPISODES_EMITTED.inc_by(emitted.len() as u64);

        let finished_at = Utc::now();
        info!(
            emitted = emitted.len(),
            notices = notices.len(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Batch run complete"
        );

        Ok(BatchReport {
            emitted,
            notices,
            shows,
            started_at,
            finished_at,
        })
    }
}

/// Hand every emitted episode to `opener`, in order.
///
/// Failures do not stop the hand-off; each one is returned as a notice.
pub fn dispatch_emitted(episodes: &[Episode], opener: &dyn MagnetOpener) -> Vec<String> {
    let mut notices = Vec::new();
    for episode in episodes {
        match opener.open_magnet(episode.magnet()) {
            Ok(()) => debug!(episode = %episode, opener = opener.name(), "Opened magnet"),
            Err(e) => {
                warn!(episode = %episode, opener = opener.name(), error = %e, "Failed to open magnet");
                notices.push(format!("{}: {}", episode, e));
            }
        }
    }
    notices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, EpisodeKey};
    use crate::pagination::PaginationConfig;
    use crate::testing::{fixtures, MockCatalog, MockLedgerStore, MockOpener};

    fn orchestrator(catalog: &Arc<MockCatalog>, ledger: &Arc<MockLedgerStore>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            catalog.clone(),
            PaginationCoordinator::new(catalog.clone(), PaginationConfig::default()),
            ledger.clone(),
        )
    }

    fn key(title: &str) -> EpisodeKey {
        EpisodeKey::new(title, Quality::P1080).unwrap()
    }

    fn titles(episodes: &[Episode]) -> Vec<&str> {
        episodes.iter().map(|e| e.title()).collect()
    }

    /// Show "X" (id 42) with releases 4..=6 at every quality.
    fn catalog_with_x() -> Arc<MockCatalog> {
        let catalog = Arc::new(MockCatalog::new());
        catalog.add_show(fixtures::show("X"), "42");
        catalog.set_page("42", 0, fixtures::release_range(4, 6));
        catalog.set_page("42", 1, "DONE");
        catalog
    }

    #[tokio::test]
    async fn test_run_emits_only_unseen_episodes() {
        let catalog = catalog_with_x();
        let mut record = DownloadRecord::new();
        record.record("X", [key("X - 4"), key("X - 5")]);
        let ledger = Arc::new(MockLedgerStore::with_record(record));

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();

        assert_eq!(titles(&report.emitted), vec!["X - 6"]);
        assert!(report.notices.is_empty());
        assert_eq!(
            report.shows,
            vec![ShowOutcome::Checked {
                title: "X".to_string(),
                seen: 3,
                new: 1,
            }]
        );

        let saved = ledger.saved().unwrap();
        assert_eq!(saved.history("X").unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_run_twice_emits_nothing_second_time() {
        let catalog = catalog_with_x();
        let ledger = Arc::new(MockLedgerStore::new());
        let orchestrator = orchestrator(&catalog, &ledger);

        let first = orchestrator
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();
        assert_eq!(first.emitted.len(), 3);

        let second = orchestrator
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();
        assert!(second.no_new_releases());
        assert_eq!(second.notices, vec![NO_NEW_RELEASES.to_string()]);
    }

    #[tokio::test]
    async fn test_dry_run_leaves_episodes_new() {
        let catalog = catalog_with_x();
        let ledger = Arc::new(MockLedgerStore::new());

        let dry = orchestrator(&catalog, &ledger)
            .with_dry_run(true)
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();
        assert_eq!(dry.emitted.len(), 3);
        assert_eq!(ledger.save_count(), 0);

        let real = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();
        assert_eq!(titles(&real.emitted), vec!["X - 4", "X - 5", "X - 6"]);
        assert_eq!(ledger.save_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_show_does_not_stop_run() {
        let catalog = catalog_with_x();
        catalog.add_show(fixtures::show("Y"), "7");
        catalog.fail_page("7", 0, CatalogError::Network("connection refused".into()));
        let ledger = Arc::new(MockLedgerStore::new());

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("Y"), fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();

        assert_eq!(report.emitted.len(), 3);
        assert_eq!(report.failed_shows().count(), 1);
        assert!(report.notices.iter().any(|n| n.starts_with("Y: ")));

        let saved = ledger.saved().unwrap();
        assert!(saved.history("Y").is_none());
        assert!(saved.history("X").is_some());
    }

    #[tokio::test]
    async fn test_unresolvable_show_is_reported() {
        let catalog = Arc::new(MockCatalog::new());
        let ledger = Arc::new(MockLedgerStore::new());

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("Unknown")], Quality::P1080)
            .await
            .unwrap();

        assert!(report.emitted.is_empty());
        assert!(matches!(report.shows[0], ShowOutcome::Failed { .. }));
        assert!(report.notices.contains(&NO_NEW_RELEASES.to_string()));
    }

    #[tokio::test]
    async fn test_persist_failure_fails_run() {
        let catalog = catalog_with_x();
        let ledger = Arc::new(MockLedgerStore::new());
        ledger.fail_saves(true);

        let result = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X")], Quality::P1080)
            .await;

        assert!(matches!(result, Err(BatchError::LedgerPersist(_))));
    }

    #[tokio::test]
    async fn test_corrupt_ledger_counts_everything_as_new() {
        let catalog = catalog_with_x();
        let ledger = Arc::new(MockLedgerStore::new());
        ledger.set_corrupt("expected value at line 1");

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();

        assert_eq!(report.emitted.len(), 3);
        assert!(report.notices[0].contains("download ledger could not be read"));
        assert!(ledger.saved().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_tracked_titles_processed_once() {
        let catalog = catalog_with_x();
        let ledger = Arc::new(MockLedgerStore::new());

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X"), fixtures::show("X")], Quality::P1080)
            .await
            .unwrap();

        assert_eq!(report.emitted.len(), 3);
        assert_eq!(report.shows.len(), 1);
        assert_eq!(catalog.requested_offsets("42"), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_skipped_entries_become_notice() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.add_show(fixtures::show("X"), "42");
        catalog.set_page(
            "42",
            0,
            fixtures::release_page(&[(2, &[Quality::P480][..]), (1, &Quality::ALL[..])]),
        );
        catalog.set_page("42", 1, "DONE");
        let ledger = Arc::new(MockLedgerStore::new());

        let report = orchestrator(&catalog, &ledger)
            .run(&[fixtures::show("X")], Quality::P720)
            .await
            .unwrap();

        assert_eq!(titles(&report.emitted), vec!["X - 1"]);
        assert_eq!(report.notices, vec!["X: 1 releases not available in 720p".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_tracking_list() {
        let catalog = Arc::new(MockCatalog::new());
        let ledger = Arc::new(MockLedgerStore::new());

        let report = orchestrator(&catalog, &ledger)
            .run(&[], Quality::P1080)
            .await
            .unwrap();

        assert!(report.shows.is_empty());
        assert_eq!(report.notices, vec![NO_NEW_RELEASES.to_string()]);
    }

    #[test]
    fn test_dispatch_emitted_collects_failures() {
        let opener = MockOpener::new();
        opener.fail_on("magnet:?dn=bad");
        let episodes = vec![
            Episode::new("X - 1", "magnet:?dn=good", Quality::P1080).unwrap(),
            Episode::new("X - 2", "magnet:?dn=bad", Quality::P1080).unwrap(),
        ];

        let notices = dispatch_emitted(&episodes, &opener);

        assert_eq!(opener.opened(), vec!["magnet:?dn=good".to_string()]);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("X - 2"));
    }
}
