//! In-memory ledger store for testing.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ledger::{DownloadRecord, LedgerError, LedgerStore};

/// Mock implementation of [`LedgerStore`] holding the record in memory.
#[derive(Debug, Default)]
pub struct MockLedgerStore {
    record: Mutex<DownloadRecord>,
    last_saved: Mutex<Option<DownloadRecord>>,
    corrupt: Mutex<Option<String>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MockLedgerStore {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger that loads `record`.
    pub fn with_record(record: DownloadRecord) -> Self {
        let store = Self::new();
        *store.record.lock().unwrap() = record;
        store
    }

    /// Fail loads as if the stored file were corrupt, until the next save.
    pub fn set_corrupt(&self, reason: &str) {
        *self.corrupt.lock().unwrap() = Some(reason.to_string());
    }

    /// Make saves fail with an I/O error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// The most recently saved record, if any save succeeded.
    pub fn saved(&self) -> Option<DownloadRecord> {
        self.last_saved.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl LedgerStore for MockLedgerStore {
    fn load(&self) -> Result<DownloadRecord, LedgerError> {
        if let Some(reason) = self.corrupt.lock().unwrap().clone() {
            return Err(LedgerError::Corrupt(reason));
        }
        Ok(self.record.lock().unwrap().clone())
    }

    fn save(&self, record: &DownloadRecord) -> Result<(), LedgerError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LedgerError::Io {
                path: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        *self.record.lock().unwrap() = record.clone();
        *self.last_saved.lock().unwrap() = Some(record.clone());
        *self.corrupt.lock().unwrap() = None;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
