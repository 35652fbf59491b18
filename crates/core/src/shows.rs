//! Saved (tracked) shows file.
//!
//! `{"Saved_Shows": [{"title": "...", "link": "..."}, ...]}`

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Show;
use crate::ledger::write_atomic;

#[derive(Debug, Error)]
pub enum ShowsError {
    #[error("saved shows file is invalid: {0}")]
    Invalid(String),

    #[error("saved shows I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The list of shows a batch run checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedShows {
    #[serde(rename = "Saved_Shows", default)]
    pub shows: Vec<Show>,
}

impl SavedShows {
    /// Read the file at `path`; a missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self, ShowsError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ShowsError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(&contents).map_err(|e| ShowsError::Invalid(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ShowsError> {
        let json =
            serde_json::to_vec_pretty(self).map_err(|e| ShowsError::Invalid(e.to_string()))?;
        write_atomic(path, &json).map_err(|e| ShowsError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Track a show. Returns false if a show with that title is already tracked.
    pub fn add(&mut self, show: Show) -> bool {
        if self.shows.iter().any(|s| s.title == show.title) {
            return false;
        }
        self.shows.push(show);
        true
    }

    /// Stop tracking a show. Returns false if it was not tracked.
    pub fn remove(&mut self, title: &str) -> bool {
        let before = self.shows.len();
        self.shows.retain(|s| s.title != title);
        self.shows.len() != before
    }
}
