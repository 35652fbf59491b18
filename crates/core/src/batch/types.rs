//! Types for batch runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::catalog::{CatalogError, Episode};
use crate::ledger::LedgerError;
use crate::pagination::CollectError;

/// Notice added when a run finds nothing new.
pub const NO_NEW_RELEASES: &str = "no new releases";

/// What happened to one tracked show during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ShowOutcome {
    /// Episodes were collected and compared against the ledger.
    Checked {
        title: String,
        /// Episodes currently listed at the requested quality.
        seen: usize,
        /// Of those, episodes not in the ledger.
        new: usize,
    },
    /// The show could not be checked; its ledger entry was left untouched.
    Failed { title: String, error: String },
}

impl ShowOutcome {
    pub fn title(&self) -> &str {
        match self {
            ShowOutcome::Checked { title, .. } | ShowOutcome::Failed { title, .. } => title,
        }
    }
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// New episodes to hand off, grouped by show in tracking order.
    pub emitted: Vec<Episode>,
    /// User-facing messages: recovered failures, and "no new releases" when
    /// nothing was emitted.
    pub notices: Vec<String>,
    pub shows: Vec<ShowOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// True when the run succeeded but found nothing to emit.
    pub fn no_new_releases(&self) -> bool {
        self.emitted.is_empty()
    }

    pub fn failed_shows(&self) -> impl Iterator<Item = &ShowOutcome> {
        self.shows
            .iter()
            .filter(|s| matches!(s, ShowOutcome::Failed { .. }))
    }
}

/// Failure checking a single show. Never aborts the run.
#[derive(Debug, Error)]
pub enum ShowError {
    #[error("could not resolve show id: {0}")]
    Resolve(#[source] CatalogError),

    #[error(transparent)]
    Collect(#[from] CollectError),
}

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The updated ledger could not be written. Nothing from this run should
    /// be handed off; re-running recomputes the same delta.
    #[error("failed to persist download ledger: {0}")]
    LedgerPersist(#[source] LedgerError),
}
