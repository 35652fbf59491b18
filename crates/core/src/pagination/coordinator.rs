//! Pagination coordinator implementation.
//!
//! Walks a show's release index in one of two modes:
//! - Linear: one page at a time until the sentinel page
//! - Bulk: estimate the page count from page 0, then fetch every page concurrently

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::{
    extract_page, CatalogError, Episode, PageReleases, Quality, ReleaseIndexPage, ReleaseSource,
    Show,
};
use crate::metrics;

use super::config::PaginationConfig;
use super::ordering::sort_episodes;

/// How to walk a show's release index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Sequential pages until the sentinel.
    #[default]
    Linear,
    /// Estimate the page count from the highest release id on page 0 and
    /// fetch all pages concurrently. Best-effort: assumes release ids are
    /// dense, so sparse numbering can over- or under-fetch.
    Bulk,
}

impl FetchMode {
    pub fn from_bulk_flag(bulk: bool) -> Self {
        if bulk {
            FetchMode::Bulk
        } else {
            FetchMode::Linear
        }
    }
}

/// Episodes gathered for one show.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Deduplicated by key and in display order.
    pub episodes: Vec<Episode>,
    /// Recovered problems (failed or unparseable pages, truncation).
    pub warnings: Vec<String>,
    /// Release entries that did not offer the requested quality.
    pub skipped_entries: usize,
    /// Pages retrieved, including the sentinel page.
    pub pages_fetched: u32,
}

impl Collection {
    fn absorb(&mut self, releases: PageReleases) {
        metrics::ENTRIES_SKIPPED.inc_by(releases.skipped as u64);
        self.skipped_entries += releases.skipped;
        self.episodes.extend(releases.episodes);
    }

    /// Drop repeated keys (first occurrence wins) and sort.
    fn finish(mut self) -> Self {
        let mut seen = HashSet::new();
        self.episodes.retain(|e| seen.insert(e.key().clone()));
        sort_episodes(&mut self.episodes);
        self
    }
}

/// Errors that abort collection for a show.
#[derive(Debug, Error)]
pub enum CollectError {
    /// A page the traversal cannot proceed without failed to download.
    #[error("failed to fetch page {offset}: {source}")]
    PageFetch {
        offset: u32,
        #[source]
        source: CatalogError,
    },
}

/// Drives page retrieval for a show and merges the results.
pub struct PaginationCoordinator {
    source: Arc<dyn ReleaseSource>,
    config: PaginationConfig,
}

impl PaginationCoordinator {
    /// Create a new coordinator over the given page source.
    pub fn new(source: Arc<dyn ReleaseSource>, config: PaginationConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Collect every episode of `show` offered at `quality`.
    ///
    /// The returned episodes are ordered and free of duplicate keys, whatever
    /// order the pages arrived in.
    pub async fn collect_episodes(
        &self,
        show: &Show,
        show_id: &str,
        quality: Quality,
        mode: FetchMode,
    ) -> Result<Collection, CollectError> {
        debug!(
            show = %show.title,
            show_id,
            quality = %quality,
            mode = ?mode,
            source = self.source.name(),
            "Collecting episodes"
        );

        let collection = match mode {
            FetchMode::Linear => {
                self.collect_linear(show, show_id, quality, 0, Collection::default())
                    .await?
            }
            FetchMode::Bulk => self.collect_bulk(show, show_id, quality).await?,
        };

        let collection = collection.finish();
        info!(
            show = %show.title,
            episodes = collection.episodes.len(),
            pages = collection.pages_fetched,
            skipped = collection.skipped_entries,
            warnings = collection.warnings.len(),
            "Collected episodes"
        );
        Ok(collection)
    }

    /// Fetch and parse one page.
    async fn fetch_page(
        &self,
        show: &Show,
        show_id: &str,
        quality: Quality,
        offset: u32,
    ) -> Result<ReleaseIndexPage, CatalogError> {
        let raw = self.source.fetch_page(show, show_id, offset).await?;
        extract_page(&raw, show, quality)
    }

    /// Request pages `start`, `start + 1`, ... until the sentinel.
    async fn collect_linear(
        &self,
        show: &Show,
        show_id: &str,
        quality: Quality,
        start: u32,
        mut collection: Collection,
    ) -> Result<Collection, CollectError> {
        let mut offset = start;

        loop {
            if offset >= self.config.max_pages {
                warn!(show = %show.title, max_pages = self.config.max_pages, "Page limit reached");
                collection.warnings.push(format!(
                    "stopped after {} pages without reaching the end of the release index",
                    self.config.max_pages
                ));
                return Ok(collection);
            }

            match self.fetch_page(show, show_id, quality, offset).await {
                Ok(ReleaseIndexPage::Done) => {
                    collection.pages_fetched += 1;
                    return Ok(collection);
                }
                Ok(ReleaseIndexPage::Releases(releases)) => {
                    collection.pages_fetched += 1;
                    collection.absorb(releases);
                }
                Err(source @ CatalogError::Network(_)) => {
                    return Err(CollectError::PageFetch { offset, source });
                }
                Err(e) => {
                    warn!(show = %show.title, offset, error = %e, "Stopping at unparseable page");
                    collection.pages_fetched += 1;
                    collection
                        .warnings
                        .push(format!("page {} could not be parsed ({}); stopped there", offset, e));
                    return Ok(collection);
                }
            }

            offset += 1;
        }
    }

    /// Estimate the page count from page 0 and fetch the rest concurrently.
    ///
    /// A network failure on page 0 fails the show. An unparseable page 0 is
    /// not fatal: the result is empty with a warning. Failures on later pages
    /// only drop that page.
    async fn collect_bulk(
        &self,
        show: &Show,
        show_id: &str,
        quality: Quality,
    ) -> Result<Collection, CollectError> {
        let mut collection = Collection::default();

        let first = match self.fetch_page(show, show_id, quality, 0).await {
            Ok(ReleaseIndexPage::Done) => {
                collection.pages_fetched = 1;
                return Ok(collection);
            }
            Ok(ReleaseIndexPage::Releases(releases)) => releases,
            Err(source @ CatalogError::Network(_)) => {
                return Err(CollectError::PageFetch { offset: 0, source });
            }
            Err(e) => {
                collection.pages_fetched = 1;
                collection
                    .warnings
                    .push(format!("page 0 could not be parsed ({})", e));
                return Ok(collection);
            }
        };
        collection.pages_fetched = 1;

        let Some(last_id) = first.highest_id else {
            warn!(show = %show.title, "No numeric release id on page 0, falling back to linear");
            collection.warnings.push(
                "no numeric release id on the first page; fell back to linear traversal"
                    .to_string(),
            );
            collection.absorb(first);
            return self
                .collect_linear(show, show_id, quality, 1, collection)
                .await;
        };
        collection.absorb(first);

        let page_size = u64::from(self.config.page_size.max(1));
        let estimated = last_id / page_size + 1;
        let pages = estimated.min(u64::from(self.config.max_pages)) as u32;
        let capped = estimated > u64::from(pages);
        if capped {
            collection.warnings.push(format!(
                "estimated {} pages, only the first {} were requested",
                estimated, pages
            ));
        }

        debug!(
            show = %show.title,
            last_id,
            pages,
            concurrency = self.config.max_concurrent_fetches,
            "Fetching estimated pages concurrently"
        );

        // Each task owns its result; completion order is arbitrary.
        let mut results: Vec<(u32, Result<ReleaseIndexPage, CatalogError>)> =
            stream::iter(1..pages)
                .map(|offset| async move {
                    (offset, self.fetch_page(show, show_id, quality, offset).await)
                })
                .buffer_unordered(self.config.max_concurrent_fetches.max(1))
                .collect()
                .await;
        results.sort_by_key(|(offset, _)| *offset);

        for (offset, result) in results {
            match result {
                Ok(ReleaseIndexPage::Done) => {
                    collection.pages_fetched += 1;
                    debug!(show = %show.title, offset, "Estimated page is past the end");
                }
                Ok(ReleaseIndexPage::Releases(releases)) => {
                    collection.pages_fetched += 1;
                    let entries = releases.episodes.len() + releases.skipped;
                    if !capped && offset == pages - 1 && entries >= page_size as usize {
                        warn!(show = %show.title, offset, "Estimated page count looks short");
                        collection.warnings.push(format!(
                            "last estimated page {} was not the end of the release index; \
                             later releases may be missing",
                            offset
                        ));
                    }
                    collection.absorb(releases);
                }
                Err(e) => {
                    warn!(show = %show.title, offset, error = %e, "Page failed in bulk fetch");
                    collection
                        .warnings
                        .push(format!("page {} failed: {}", offset, e));
                }
            }
        }

        Ok(collection)
    }
}
