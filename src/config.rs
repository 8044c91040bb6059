// Application configuration read from the environment

use crate::catalog::{Catalog, CatalogError, SAMPLE_CATALOG_PATH};
use crate::http_client::{ClientConfig, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub booking_api_url: String,
    pub catalog_path: String,
    pub request_timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            booking_api_url: "http://localhost:5000/api".into(),
            catalog_path: SAMPLE_CATALOG_PATH.into(),
            request_timeout_ms: 5000,
            max_retries: 3,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // Unset or unparsable values fall back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            booking_api_url: lookup("BOOKING_API_URL").unwrap_or(defaults.booking_api_url),
            catalog_path: lookup("CATALOG_PATH").unwrap_or(defaults.catalog_path),
            request_timeout_ms: lookup("REQUEST_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),
            max_retries: lookup("MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.booking_api_url.clone(),
            timeout_ms: self.request_timeout_ms,
            retry_config: RetryConfig {
                max_retries: self.max_retries,
                ..RetryConfig::default()
            },
        }
    }

    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        Catalog::load(&self.catalog_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BOOKING_API_URL", "https://bookings.example.com/api"),
            ("CATALOG_PATH", "/etc/wedding/catalog.json"),
            ("REQUEST_TIMEOUT_MS", "1500"),
            ("MAX_RETRIES", "0"),
        ]));

        assert_eq!(config.booking_api_url, "https://bookings.example.com/api");
        assert_eq!(config.catalog_path, "/etc/wedding/catalog.json");
        assert_eq!(config.request_timeout_ms, 1500);
        assert_eq!(config.max_retries, 0);

        let client = config.client_config();
        assert_eq!(client.timeout_ms, 1500);
        assert_eq!(client.retry_config.max_retries, 0);
        assert_eq!(client.retry_config.initial_backoff_ms, 100);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("REQUEST_TIMEOUT_MS", "soon"),
            ("MAX_RETRIES", "-1"),
        ]));
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_load_catalog_from_configured_path() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(SAMPLE_CATALOG_PATH);
        let config = AppConfig {
            catalog_path: path.to_string_lossy().into_owned(),
            ..AppConfig::default()
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.discount_percent("WEDDING15"), Some(15));

        let missing = AppConfig {
            catalog_path: "nowhere/catalog.json".into(),
            ..AppConfig::default()
        };
        assert!(missing.load_catalog().is_err());
    }
}
