//! Ledger persistence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{DownloadRecord, LedgerError};

/// Storage for the download ledger.
pub trait LedgerStore: Send + Sync {
    /// Read the persisted record. A missing ledger is an empty record.
    fn load(&self) -> Result<DownloadRecord, LedgerError>;

    /// Replace the persisted record with `record`.
    fn save(&self, record: &DownloadRecord) -> Result<(), LedgerError>;
}

/// Ledger kept in a JSON file, rewritten wholesale on every save.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    path: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<DownloadRecord, LedgerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No ledger file yet");
                return Ok(DownloadRecord::new());
            }
            Err(e) => {
                return Err(LedgerError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        if contents.trim().is_empty() {
            return Ok(DownloadRecord::new());
        }

        let record: DownloadRecord =
            serde_json::from_str(&contents).map_err(|e| LedgerError::Corrupt(e.to_string()))?;
        debug!(path = %self.path.display(), shows = record.len(), "Loaded ledger");
        Ok(record)
    }

    fn save(&self, record: &DownloadRecord) -> Result<(), LedgerError> {
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.path, &json).map_err(|e| LedgerError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;
        debug!(path = %self.path.display(), shows = record.len(), "Saved ledger");
        Ok(())
    }
}

/// Write `contents` to a sibling temp file and rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)
}
