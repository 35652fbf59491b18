//! Command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use relwatch_core::{
    dispatch_emitted, metrics, BatchOrchestrator, Config, Episode, FetchMode, HttpCatalog,
    JsonLedgerStore, PaginationCoordinator, Quality, SavedShows, Show, ShowDirectory,
    ShowOutcome, SystemOpener,
};

pub struct EpisodesOptions {
    pub title: Option<String>,
    pub quality: Option<Quality>,
    pub bulk: bool,
    pub open: bool,
}

pub struct RunOptions {
    pub quality: Option<Quality>,
    pub bulk: bool,
    pub dry_run: bool,
    pub metrics: bool,
}

fn catalog(config: &Config) -> Result<Arc<HttpCatalog>> {
    let catalog = HttpCatalog::new(&config.catalog).context("Failed to create catalog client")?;
    Ok(Arc::new(catalog))
}

fn fetch_mode(config: &Config, bulk_flag: bool) -> FetchMode {
    if bulk_flag {
        FetchMode::Bulk
    } else {
        config.fetch.mode()
    }
}

/// Show title from the last path segment of its link, e.g. "/shows/one-piece/" -> "one-piece".
fn title_from_link(link: &str) -> String {
    link.trim_end_matches('/')
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(link)
        .to_string()
}

fn print_episodes(episodes: &[Episode]) {
    for episode in episodes {
        println!("{}\t{}", episode, episode.magnet());
    }
}

fn print_notices(notices: &[String]) {
    for notice in notices {
        eprintln!("note: {}", notice);
    }
}

fn load_saved_shows(path: &Path) -> Result<SavedShows> {
    SavedShows::load(path).with_context(|| format!("Failed to read saved shows from {:?}", path))
}

pub async fn search(config: &Config, query: &str) -> Result<()> {
    let shows = catalog(config)?
        .search_shows(query)
        .await
        .with_context(|| format!("Show search for '{}' failed", query))?;

    if shows.is_empty() {
        println!("No shows match '{}'", query);
    }
    for show in shows {
        println!("{}\t{}", show.title, show.link);
    }
    Ok(())
}

pub async fn episodes(config: &Config, link: &str, options: EpisodesOptions) -> Result<()> {
    let title = options.title.unwrap_or_else(|| title_from_link(link));
    let show = Show::new(title, link);
    let quality = options.quality.unwrap_or(config.fetch.quality);
    let mode = fetch_mode(config, options.bulk);

    let catalog = catalog(config)?;
    let show_id = catalog
        .resolve_show_id(&show)
        .await
        .with_context(|| format!("Failed to resolve show id for {}", show.link))?;
    let coordinator = PaginationCoordinator::new(catalog, config.fetch.pagination.clone());
    let collection = coordinator
        .collect_episodes(&show, &show_id, quality, mode)
        .await
        .with_context(|| format!("Failed to collect episodes of {}", show.title))?;

    print_episodes(&collection.episodes);
    print_notices(&collection.warnings);
    if collection.skipped_entries > 0 {
        eprintln!(
            "note: {} releases not available in {}",
            collection.skipped_entries, quality
        );
    }

    if options.open {
        print_notices(&dispatch_emitted(&collection.episodes, &SystemOpener::new()));
    }
    Ok(())
}

pub fn track(config: &Config, title: String, link: String) -> Result<()> {
    let path = &config.storage.saved_shows_path;
    let mut saved = load_saved_shows(path)?;

    if !saved.add(Show::new(title.clone(), link)) {
        println!("Already tracking {}", title);
        return Ok(());
    }
    saved
        .save(path)
        .with_context(|| format!("Failed to write saved shows to {:?}", path))?;
    info!(show = %title, "Tracking show");
    println!("Tracking {}", title);
    Ok(())
}

pub fn untrack(config: &Config, title: &str) -> Result<()> {
    let path = &config.storage.saved_shows_path;
    let mut saved = load_saved_shows(path)?;

    if !saved.remove(title) {
        println!("Not tracking {}", title);
        return Ok(());
    }
    saved
        .save(path)
        .with_context(|| format!("Failed to write saved shows to {:?}", path))?;
    println!("Stopped tracking {}", title);
    Ok(())
}

pub fn shows(config: &Config) -> Result<()> {
    let saved = load_saved_shows(&config.storage.saved_shows_path)?;
    if saved.shows.is_empty() {
        println!("No tracked shows");
    }
    for show in &saved.shows {
        println!("{}\t{}", show.title, show.link);
    }
    Ok(())
}

pub async fn run_batch(config: &Config, options: RunOptions) -> Result<()> {
    let saved = load_saved_shows(&config.storage.saved_shows_path)?;
    if saved.shows.is_empty() {
        println!("No tracked shows; add one with `relwatch track <title> <link>`");
        return Ok(());
    }

    let quality = options.quality.unwrap_or(config.fetch.quality);
    let catalog = catalog(config)?;
    let orchestrator = BatchOrchestrator::new(
        catalog.clone(),
        PaginationCoordinator::new(catalog, config.fetch.pagination.clone()),
        Arc::new(JsonLedgerStore::new(&config.storage.ledger_path)),
    )
    .with_mode(fetch_mode(config, options.bulk))
    .with_dry_run(options.dry_run);

    let report = orchestrator
        .run(&saved.shows, quality)
        .await
        .context("Batch run failed")?;

    for outcome in &report.shows {
        if let ShowOutcome::Failed { title, error } = outcome {
            warn!(show = %title, error = %error, "Show skipped");
        }
    }
    print_episodes(&report.emitted);
    print_notices(&report.notices);

    if !options.dry_run {
        print_notices(&dispatch_emitted(&report.emitted, &SystemOpener::new()));
    }
    if options.metrics {
        eprint!("{}", metrics::encode_metrics());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.saved_shows_path = dir.path().join("saved_shows.json");
        config.storage.ledger_path = dir.path().join("downloaded.json");
        config
    }

    #[test]
    fn test_title_from_link() {
        assert_eq!(title_from_link("/shows/one-piece"), "one-piece");
        assert_eq!(title_from_link("https://catalog.example/shows/x/"), "x");
        assert_eq!(title_from_link("x"), "x");
    }

    #[test]
    fn test_fetch_mode_flag_overrides_config() {
        let mut config = Config::default();
        assert_eq!(fetch_mode(&config, false), FetchMode::Linear);
        assert_eq!(fetch_mode(&config, true), FetchMode::Bulk);
        config.fetch.bulk_mode = true;
        assert_eq!(fetch_mode(&config, false), FetchMode::Bulk);
    }

    #[test]
    fn test_track_and_untrack() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        track(&config, "X".to_string(), "/shows/x".to_string()).unwrap();
        track(&config, "X".to_string(), "/shows/x".to_string()).unwrap();
        let saved = SavedShows::load(&config.storage.saved_shows_path).unwrap();
        assert_eq!(saved.shows, vec![Show::new("X", "/shows/x")]);

        untrack(&config, "X").unwrap();
        let saved = SavedShows::load(&config.storage.saved_shows_path).unwrap();
        assert!(saved.shows.is_empty());
    }

    #[tokio::test]
    async fn test_run_without_tracked_shows_is_noop() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);

        let options = RunOptions {
            quality: None,
            bulk: false,
            dry_run: true,
            metrics: false,
        };
        run_batch(&config, options).await.unwrap();
        assert!(!config.storage.ledger_path.exists());
    }
}
