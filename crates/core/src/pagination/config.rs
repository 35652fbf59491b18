//! Pagination configuration.

use serde::{Deserialize, Serialize};

/// Limits for walking a show's release index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Release entries the catalog serves per page.
    /// Bulk mode divides the highest release id by this to estimate the page count.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Upper bound on pages requested for a single show, in either mode.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum page fetches in flight at once in bulk mode.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_page_size() -> u32 {
    12
}

fn default_max_pages() -> u32 {
    500
}

fn default_max_concurrent_fetches() -> usize {
    16
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_size, 12);
        assert_eq!(config.max_pages, 500);
        assert_eq!(config.max_concurrent_fetches, 16);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            page_size = 25
        "#;
        let config: PaginationConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.page_size, 25);
        assert_eq!(config.max_pages, 500);
    }
}
