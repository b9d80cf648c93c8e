use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::{default_chain, ProviderDescriptor};
use crate::render::QuoteTargets;

/// Main configuration structure
///
/// Loaded from the config file, then overridden by CLI flags and env vars.
/// Priority: CLI > Env > File > Defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub page: PageConfig,
    /// Fallback chain, highest priority first
    #[serde(default = "default_chain")]
    pub providers: Vec<ProviderDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            cache: CacheConfig::default(),
            page: PageConfig::default(),
            providers: default_chain(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        toml::from_str(contents)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// `<config dir>/dailyquote/config.toml`
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?;

        Ok(config_dir.join("dailyquote").join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds each provider gets before we try the next one
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// How long a fetched quote stays fresh
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u64,

    /// Database file; defaults to the platform cache dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    24
}

impl CacheConfig {
    /// `path`, or `<cache dir>/dailyquote/quote.db`
    pub fn db_path(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find cache directory".into()))?;
        Ok(cache_dir.join("dailyquote").join("quote.db"))
    }

    pub fn ttl(&self) -> chrono::Duration {
        // Capped well inside chrono's range
        chrono::Duration::hours(self.ttl_hours.min(1_000_000) as i64)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_hours: default_cache_ttl(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_text_element")]
    pub text_element: String,

    #[serde(default = "default_from_element")]
    pub from_element: String,
}

fn default_text_element() -> String {
    "quote-text".to_string()
}

fn default_from_element() -> String {
    "quote-from".to_string()
}

impl PageConfig {
    pub fn targets(&self) -> QuoteTargets {
        QuoteTargets::new(&self.text_element, &self.from_element)
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            text_element: default_text_element(),
            from_element: default_from_element(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ResponseFormat, Transport};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_secs, 5);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.page.targets(), QuoteTargets::default());
        assert_eq!(config.providers.len(), 2);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [cache]
            enabled = false

            [page]
            text_element = "motd"
            "#,
        )
        .unwrap();

        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.page.text_element, "motd");
        assert_eq!(config.page.from_element, "quote-from");
        assert_eq!(config.providers, default_chain());
    }

    #[test]
    fn test_custom_provider_chain() {
        let config = Config::from_toml(
            r#"
            [[providers]]
            name = "local"
            url = "http://localhost:8080/quote"
            transport = "script-injection"
            format = "passthrough"
            "#,
        )
        .unwrap();

        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.providers[0].transport, Transport::ScriptInjection);
        assert_eq!(config.providers[0].format, ResponseFormat::Passthrough);
    }

    #[test]
    fn test_bad_transport_is_config_error() {
        let result = Config::from_toml(
            r#"
            [[providers]]
            name = "x"
            url = "http://x"
            transport = "carrier-pigeon"
            format = "hitokoto"
            "#,
        );
        assert!(matches!(result, Err(crate::Error::ConfigError(_))));
    }

    #[test]
    fn test_config_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dailyquote").join("config.toml");

        let mut config = Config::default();
        config.fetch.timeout_secs = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.fetch.timeout(), Duration::from_secs(2));
        assert_eq!(loaded.providers, config.providers);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.cache.ttl_hours, 24);
    }
}
