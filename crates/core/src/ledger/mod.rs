//! Download ledger.
//!
//! Persisted record of the episodes already surfaced per show, used to emit
//! only releases that are new since the previous run.

mod delta;
mod store;
mod types;

pub use delta::compute_new;
pub use store::{JsonLedgerStore, LedgerStore};
pub(crate) use store::write_atomic;
pub use types::{DownloadRecord, LedgerError, ShowHistory};
