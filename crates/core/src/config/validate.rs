use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Catalog base URL has an http(s) scheme
/// - Timeout and pagination limits are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.catalog.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "catalog.base_url must start with http:// or https:// (got '{}')",
            base_url
        )));
    }

    if config.catalog.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "catalog.timeout_secs cannot be 0".to_string(),
        ));
    }

    let pagination = &config.fetch.pagination;
    if pagination.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.page_size cannot be 0".to_string(),
        ));
    }
    if pagination.max_pages == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.max_pages cannot be 0".to_string(),
        ));
    }
    if pagination.max_concurrent_fetches == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.max_concurrent_fetches cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = Config::default();
        config.catalog.base_url = "ftp://catalog.example".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.catalog.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_pagination_limits_fail() {
        let mut config = Config::default();
        config.fetch.pagination.page_size = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.fetch.pagination.max_pages = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.fetch.pagination.max_concurrent_fetches = 0;
        assert!(validate_config(&config).is_err());
    }
}
