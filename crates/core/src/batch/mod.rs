//! Batch download orchestration.
//!
//! Checks every tracked show in turn (pages within a show may be fetched
//! concurrently), diffs the results against the download ledger, and
//! persists the ledger once at the end of the run.

mod runner;
mod types;

pub use runner::{dispatch_emitted, BatchOrchestrator};
pub use types::{BatchError, BatchReport, ShowError, ShowOutcome, NO_NEW_RELEASES};
