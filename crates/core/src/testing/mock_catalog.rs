//! Mock catalog for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::{CatalogError, RawPage, ReleaseSource, Show, ShowDirectory, DONE_SENTINEL};

type PageKey = (String, u32);

/// Mock implementation of [`ReleaseSource`] and [`ShowDirectory`].
///
/// Provides controllable behavior for testing:
/// - Serve configured page bodies per show id and offset
/// - Fail or delay individual pages
/// - Record requested pages for assertions
///
/// Pages that were never configured are served as the sentinel page.
///
/// # Example
///
/// ```rust,ignore
/// use relwatch_core::testing::{fixtures, MockCatalog};
///
/// let catalog = MockCatalog::new();
/// catalog.add_show(fixtures::show("X"), "42");
/// catalog.set_page("42", 0, fixtures::release_range(1, 3));
///
/// // ... run a collection ...
///
/// assert_eq!(catalog.requested_offsets("42"), vec![0, 1]);
/// ```
#[derive(Debug, Default)]
pub struct MockCatalog {
    pages: Mutex<HashMap<PageKey, Result<String, CatalogError>>>,
    delays: Mutex<HashMap<PageKey, Duration>>,
    requests: Mutex<Vec<PageKey>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    /// Show title -> catalog id.
    show_ids: Mutex<HashMap<String, String>>,
    resolve_errors: Mutex<HashMap<String, CatalogError>>,
    listing: Mutex<Vec<Show>>,
    search_error: Mutex<Option<CatalogError>>,
}

impl MockCatalog {
    /// Create a new mock catalog with no shows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for page `offset` of `show_id`.
    pub fn set_page(&self, show_id: &str, offset: u32, body: impl Into<String>) {
        self.pages
            .lock()
            .unwrap()
            .insert((show_id.to_string(), offset), Ok(body.into()));
    }

    /// Fail requests for page `offset` of `show_id`.
    pub fn fail_page(&self, show_id: &str, offset: u32, error: CatalogError) {
        self.pages
            .lock()
            .unwrap()
            .insert((show_id.to_string(), offset), Err(error));
    }

    /// Hold the response for a page back by `delay`.
    pub fn set_page_delay(&self, show_id: &str, offset: u32, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert((show_id.to_string(), offset), delay);
    }

    /// Register a show in the listing and map it to `show_id`.
    pub fn add_show(&self, show: Show, show_id: &str) {
        self.show_ids
            .lock()
            .unwrap()
            .insert(show.title.clone(), show_id.to_string());
        self.listing.lock().unwrap().push(show);
    }

    /// Make id resolution fail for the show titled `title`.
    pub fn fail_resolve(&self, title: &str, error: CatalogError) {
        self.resolve_errors
            .lock()
            .unwrap()
            .insert(title.to_string(), error);
    }

    /// Make show searches fail.
    pub fn fail_search(&self, error: CatalogError) {
        *self.search_error.lock().unwrap() = Some(error);
    }

    /// Offsets requested for `show_id`, in request order.
    pub fn requested_offsets(&self, show_id: &str) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == show_id)
            .map(|(_, offset)| *offset)
            .collect()
    }

    /// Most page requests that were outstanding at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total number of page requests.
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ReleaseSource for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_page(
        &self,
        _show: &Show,
        show_id: &str,
        offset: u32,
    ) -> Result<RawPage, CatalogError> {
        let key = (show_id.to_string(), offset);
        self.requests.lock().unwrap().push(key.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.lock().unwrap().get(&key).cloned();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match page {
            Some(Ok(body)) => Ok(RawPage { offset, body }),
            Some(Err(e)) => Err(e),
            None => Ok(RawPage {
                offset,
                body: DONE_SENTINEL.to_string(),
            }),
        }
    }
}

#[async_trait]
impl ShowDirectory for MockCatalog {
    async fn resolve_show_id(&self, show: &Show) -> Result<String, CatalogError> {
        if let Some(error) = self.resolve_errors.lock().unwrap().get(&show.title) {
            return Err(error.clone());
        }
        self.show_ids
            .lock()
            .unwrap()
            .get(&show.title)
            .cloned()
            .ok_or_else(|| CatalogError::Parse(format!("no show id for {}", show.title)))
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError> {
        if let Some(error) = self.search_error.lock().unwrap().clone() {
            return Err(error);
        }
        let needle = query.trim().to_lowercase();
        Ok(self
            .listing
            .lock()
            .unwrap()
            .iter()
            .filter(|show| show.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}
