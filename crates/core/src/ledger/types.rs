//! Types for the download ledger.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::EpisodeKey;

/// Episodes already surfaced for one show, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowHistory {
    pub title: String,
    pub episodes: Vec<EpisodeKey>,
}

/// Previously surfaced episodes, per show title.
///
/// Show order and per-show episode order follow the persisted file; newly
/// recorded shows and episodes are appended. Entries are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LedgerFile", into = "LedgerFile")]
pub struct DownloadRecord {
    shows: Vec<ShowHistory>,
}

impl DownloadRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    /// Number of shows with a history entry.
    pub fn len(&self) -> usize {
        self.shows.len()
    }

    pub fn shows(&self) -> impl Iterator<Item = &ShowHistory> {
        self.shows.iter()
    }

    /// History of a show, or `None` if it was never recorded.
    pub fn history(&self, show_title: &str) -> Option<&[EpisodeKey]> {
        self.shows
            .iter()
            .find(|h| h.title == show_title)
            .map(|h| h.episodes.as_slice())
    }

    /// Merge `keys` into the show's history. Returns how many were new.
    pub fn record<I>(&mut self, show_title: &str, keys: I) -> usize
    where
        I: IntoIterator<Item = EpisodeKey>,
    {
        let index = match self.shows.iter().position(|h| h.title == show_title) {
            Some(index) => index,
            None => {
                self.shows.push(ShowHistory {
                    title: show_title.to_string(),
                    episodes: Vec::new(),
                });
                self.shows.len() - 1
            }
        };

        let history = &mut self.shows[index];
        let mut known: HashSet<EpisodeKey> = history.episodes.iter().cloned().collect();
        let mut added = 0;
        for key in keys {
            if known.insert(key.clone()) {
                history.episodes.push(key);
                added += 1;
            }
        }
        added
    }
}

/// On-disk shape: `{"Downloaded": [{"<show title>": ["<episode key>", ...]}, ...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(rename = "Downloaded")]
    downloaded: Vec<BTreeMap<String, Vec<EpisodeKey>>>,
}

impl From<LedgerFile> for DownloadRecord {
    fn from(file: LedgerFile) -> Self {
        let mut record = DownloadRecord::new();
        for entry in file.downloaded {
            for (title, episodes) in entry {
                record.record(&title, episodes);
            }
        }
        record
    }
}

impl From<DownloadRecord> for LedgerFile {
    fn from(record: DownloadRecord) -> Self {
        LedgerFile {
            downloaded: record
                .shows
                .into_iter()
                .map(|h| BTreeMap::from([(h.title, h.episodes)]))
                .collect(),
        }
    }
}

/// Errors from ledger persistence.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger file exists but does not have the documented shape.
    #[error("ledger file is corrupt: {0}")]
    Corrupt(String),

    #[error("ledger I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize ledger: {0}")]
    Serialize(#[from] serde_json::Error),
}
