pub mod batch;
pub mod catalog;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod opener;
pub mod pagination;
pub mod shows;
pub mod testing;

pub use batch::{dispatch_emitted, BatchError, BatchOrchestrator, BatchReport, ShowOutcome};
pub use catalog::{
    CatalogError, Episode, EpisodeKey, HttpCatalog, Quality, ReleaseSource, Show, ShowDirectory,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use ledger::{compute_new, DownloadRecord, JsonLedgerStore, LedgerError, LedgerStore};
pub use opener::{MagnetOpener, OpenError, SystemOpener};
pub use pagination::{
    Collection, CollectError, FetchMode, PaginationConfig, PaginationCoordinator,
};
pub use shows::{SavedShows, ShowsError};
