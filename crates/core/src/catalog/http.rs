//! HTTP catalog backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::CatalogConfig;
use crate::metrics;

use super::resolve::{parse_show_id, parse_show_listing};
use super::{CatalogError, RawPage, ReleaseSource, Show, ShowDirectory};

/// Catalog client speaking the site's page-index API over HTTP.
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    /// Create a new HttpCatalog with the given configuration.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CatalogError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the page-index URL for one page of a show.
    fn build_page_url(&self, show_id: &str, offset: u32) -> String {
        format!(
            "{}/api.php?method=getshows&type=show&showid={}&nextid={}",
            self.base_url,
            urlencoding::encode(show_id),
            offset
        )
    }

    /// Absolute URL of a show page; relative links hang off the catalog root.
    fn build_show_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}/{}", self.base_url, link.trim_start_matches('/'))
        }
    }

    fn build_listing_url(&self) -> String {
        format!("{}/shows/", self.base_url)
    }

    /// GET a URL and return its body, mapping every failure to `Network`.
    async fn get_text(&self, url: &str) -> Result<String, CatalogError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Network(format!("request timed out: {}", url))
            } else {
                CatalogError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Network(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Network(format!("request timed out: {}", url))
            } else {
                CatalogError::Network(format!("failed to read body: {}", e))
            }
        })
    }
}

#[async_trait]
impl ReleaseSource for HttpCatalog {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_page(
        &self,
        show: &Show,
        show_id: &str,
        offset: u32,
    ) -> Result<RawPage, CatalogError> {
        let url = self.build_page_url(show_id, offset);
        debug!(show = %show.title, offset, "Fetching release page");

        let start = Instant::now();
        let result = self.get_text(&url).await;
        metrics::PAGE_FETCH_DURATION.observe(start.elapsed().as_secs_f64());
        metrics::PAGE_FETCHES
            .with_label_values(&[if result.is_ok() { "success" } else { "error" }])
            .inc();

        result.map(|body| RawPage { offset, body })
    }
}

#[async_trait]
impl ShowDirectory for HttpCatalog {
    async fn resolve_show_id(&self, show: &Show) -> Result<String, CatalogError> {
        let url = self.build_show_url(&show.link);
        debug!(show = %show.title, url = %url, "Resolving show id");

        let html = self.get_text(&url).await?;
        parse_show_id(&html)
    }

    async fn search_shows(&self, query: &str) -> Result<Vec<Show>, CatalogError> {
        let html = self.get_text(&self.build_listing_url()).await?;
        let shows = parse_show_listing(&html, query);
        debug!(query, matches = shows.len(), "Show search complete");
        Ok(shows)
    }
}
