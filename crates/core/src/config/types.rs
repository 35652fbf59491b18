use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::Quality;
use crate::pagination::{FetchMode, PaginationConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Release catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Catalog root URL (e.g., "https://horriblesubs.info")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds; a page that times out is a network error (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://horriblesubs.info".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// How episodes are fetched
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FetchConfig {
    /// Quality tier to collect (1080, 720 or 480)
    #[serde(default)]
    pub quality: Quality,
    /// Fetch all pages of a show concurrently from an estimated page count.
    /// Faster for long-running shows, but the estimate is best-effort.
    #[serde(default)]
    pub bulk_mode: bool,
    #[serde(flatten)]
    pub pagination: PaginationConfig,
}

impl FetchConfig {
    pub fn mode(&self) -> FetchMode {
        FetchMode::from_bulk_flag(self.bulk_mode)
    }
}

/// Where state files live
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,
    #[serde(default = "default_saved_shows_path")]
    pub saved_shows_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            saved_shows_path: default_saved_shows_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("downloaded.json")
}

fn default_saved_shows_path() -> PathBuf {
    PathBuf::from("saved_shows.json")
}
