use crate::core::{query::DEFAULT_QUERY_TIMEOUT_SECS, MAX_LISTINGS};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub overpass: OverpassSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub search: SearchSettings,
    pub dataset: DatasetSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassSettings {
    #[serde(default = "default_overpass_url")]
    pub url: String,
    /// Client-side HTTP timeout
    #[serde(default = "default_overpass_timeout")]
    pub timeout_secs: u64,
    /// Server-side timeout written into the query header
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

impl Default for OverpassSettings {
    fn default() -> Self {
        Self {
            url: default_overpass_url(),
            timeout_secs: default_overpass_timeout(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

fn default_overpass_url() -> String { "https://overpass-api.de/api/interpreter".to_string() }
fn default_overpass_timeout() -> u64 { 30 }
fn default_query_timeout() -> u64 { DEFAULT_QUERY_TIMEOUT_SECS }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

fn default_cache_ttl() -> u64 { 300 }
fn default_cache_entries() -> usize { 256 }

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_max_listings")]
    pub max_listings: usize,
    #[serde(default = "default_radius")]
    pub default_radius_m: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_listings: default_max_listings(),
            default_radius_m: default_radius(),
        }
    }
}

fn default_max_listings() -> usize { MAX_LISTINGS }
fn default_radius() -> u32 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetSettings {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with NEARBY__)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., NEARBY__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("NEARBY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("NEARBY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let cache = CacheSettings::default();
        assert_eq!(cache.ttl_secs, 300);
        assert_eq!(cache.max_entries, 256);

        let search = SearchSettings::default();
        assert_eq!(search.max_listings, MAX_LISTINGS);
        assert_eq!(search.max_listings, 500);
        assert_eq!(search.default_radius_m, 1000);

        let overpass = OverpassSettings::default();
        assert_eq!(overpass.query_timeout_secs, DEFAULT_QUERY_TIMEOUT_SECS);
    }

    #[test]
    fn test_default_logging() {
        let logging = LoggingSettings::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, "compact");
    }

    #[test]
    fn test_minimal_file_fills_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8000

            [dataset]
            path = "data/listings_seed.json"

            [cache]
            ttl_secs = 60
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.cache.ttl_secs, 60);
        assert_eq!(settings.cache.max_entries, 256);
        assert_eq!(settings.search.max_listings, 500);
    }

    #[test]
    fn test_bundled_default_config() {
        let settings = Settings::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml")).unwrap();
        assert_eq!(settings.dataset.path, "data/listings_seed.json");
    }
}
