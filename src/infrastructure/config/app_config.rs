//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::infrastructure::image::{
    DEFAULT_API_BASE, DEFAULT_MAX_ENTRIES, DEFAULT_RESOLVE_TIMEOUT, DEFAULT_TTL,
    ImageResolverConfig, JsonFileStore, STORAGE_KEY, UrlCacheConfig,
};
use crate::presentation::image_slot::{DEFAULT_FALLBACK_IMAGE, SlotConfig};

pub(crate) const APP_NAME: &str = "trybe-images";
pub(crate) const APP_QUALIFIER: &str = "app";
pub(crate) const APP_ORGANIZATION: &str = "trybe";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// URL cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fallback and diagnostics configuration.
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

/// URL cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached URLs.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Directory of the persisted cache. Defaults to the user cache dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Persist the cache across sessions.
    #[serde(default = "default_true")]
    pub persist: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            store_dir: None,
            persist: true,
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding event and profile images.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// REST endpoint base.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Upper bound for one download-URL lookup, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fallback and diagnostics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Report fallbacks of images served from sample hosts.
    #[serde(default)]
    pub trace_fallbacks: bool,

    /// Hosts whose images should never reach a view.
    #[serde(default = "default_suspicious_hosts")]
    pub suspicious_hosts: Vec<String>,

    /// Static placeholder shown when resolution or loading fails.
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            trace_fallbacks: false,
            suspicious_hosts: default_suspicious_hosts(),
            fallback_image: default_fallback_image(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

fn default_bucket() -> String {
    "trybe-app.appspot.com".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_RESOLVE_TIMEOUT.as_secs()
}

fn default_suspicious_hosts() -> Vec<String> {
    vec!["images.unsplash.com".to_string(), "picsum.photos".to_string()]
}

fn default_fallback_image() -> String {
    DEFAULT_FALLBACK_IMAGE.to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(bucket) = &args.bucket {
            self.storage.bucket.clone_from(bucket);
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.storage.timeout_secs = timeout_secs;
        }
        if let Some(cache_dir) = &args.cache_dir {
            self.cache.store_dir = Some(cache_dir.clone());
        }
        if args.no_persist {
            self.cache.persist = false;
        }
        if args.trace_fallbacks {
            self.diagnostics.trace_fallbacks = true;
        }
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("trybe-images.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Builds the URL cache configuration.
    #[must_use]
    pub fn url_cache_config(&self) -> UrlCacheConfig {
        UrlCacheConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_entries: self.cache.max_entries,
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    /// Builds the persistent store for the URL cache.
    #[must_use]
    pub fn cache_store(&self) -> JsonFileStore {
        self.cache
            .store_dir
            .clone()
            .map_or_else(JsonFileStore::default_location, JsonFileStore::new)
    }

    /// Builds the resolver configuration.
    #[must_use]
    pub const fn resolver_config(&self) -> ImageResolverConfig {
        ImageResolverConfig {
            timeout: Duration::from_secs(self.storage.timeout_secs),
        }
    }

    /// Builds the display slot configuration.
    #[must_use]
    pub fn slot_config(&self) -> SlotConfig {
        SlotConfig {
            fallback_url: self.diagnostics.fallback_image.clone(),
            suspicious_hosts: self.diagnostics.suspicious_hosts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_match_cache_constants() {
        let config = AppConfig::default();
        let cache = config.url_cache_config();

        assert_eq!(cache.ttl, Duration::from_secs(24 * 60 * 60));
        assert_eq!(cache.max_entries, 100);
        assert_eq!(cache.storage_key, STORAGE_KEY);
        assert_eq!(config.resolver_config().timeout, DEFAULT_RESOLVE_TIMEOUT);
        assert!(config.cache.persist);
        assert!(!config.diagnostics.trace_fallbacks);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            log_level = "debug"

            [cache]
            ttl_secs = 60

            [storage]
            bucket = "staging-bucket"

            [diagnostics]
            trace_fallbacks = true
            suspicious_hosts = ["example.org"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, DEFAULT_MAX_ENTRIES);
        assert_eq!(config.storage.bucket, "staging-bucket");
        assert_eq!(config.storage.api_base, DEFAULT_API_BASE);
        assert!(config.diagnostics.trace_fallbacks);
        assert_eq!(config.slot_config().suspicious_hosts, vec!["example.org"]);
        assert_eq!(config.slot_config().fallback_url, DEFAULT_FALLBACK_IMAGE);
    }

    #[test]
    fn test_merge_with_args() {
        let args = CliArgs::parse_from([
            "trybe-images",
            "--log-level",
            "trace",
            "--bucket",
            "other-bucket",
            "--no-persist",
            "--cache-dir",
            "/tmp/trybe",
            "stats",
        ]);
        let mut config = AppConfig::default();
        config.merge_with_args(&args);

        assert_eq!(config.log_level, LogLevel::Trace);
        assert_eq!(config.storage.bucket, "other-bucket");
        assert!(!config.cache.persist);
        assert_eq!(config.cache.store_dir, Some(PathBuf::from("/tmp/trybe")));
        assert_eq!(
            config.cache_store().path_for(STORAGE_KEY),
            PathBuf::from("/tmp/trybe/trybe_image_url_cache_v1.json")
        );
    }
}
