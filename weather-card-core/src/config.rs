use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::cache::DEFAULT_TTL;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_PROXY_URL: &str = "http://localhost:8888/.netlify/functions/weather";
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_USE_PROXY: &str = "WEATHER_USE_PROXY";
pub const ENV_PROXY_URL: &str = "WEATHER_PROXY_URL";

/// Settings resolved once at startup and handed to the client by reference.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// use_proxy = false
/// cache_ttl_ms = 600000
/// debounce_ms = 600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather key, only sent in direct mode.
    pub api_key: Option<String>,

    /// Route requests through the proxy, which holds the key server-side.
    pub use_proxy: bool,

    pub base_url: String,
    pub proxy_url: String,

    pub cache_ttl_ms: Option<u64>,
    pub debounce_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            use_proxy: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            cache_ttl_ms: None,
            debounce_ms: None,
        }
    }
}

impl Config {
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_ms.map(Duration::from_millis).unwrap_or(DEFAULT_TTL)
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DEBOUNCE)
    }

    /// API key for direct mode, if one is configured and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// Apply environment overrides through `lookup`, normally `std::env::var`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(flag) = lookup(ENV_USE_PROXY) {
            self.use_proxy = is_truthy(&flag);
        }
        if let Some(url) = lookup(ENV_PROXY_URL).filter(|u| !u.trim().is_empty()) {
            self.proxy_url = url;
        }
        self
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding cached weather records.
    pub fn cache_dir() -> Result<PathBuf> {
        Ok(project_dirs()?.cache_dir().to_path_buf())
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-card", "weather-card")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();

        assert!(!cfg.use_proxy);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.cache_ttl(), Duration::from_secs(600));
        assert_eq!(cfg.debounce_window(), Duration::from_millis(600));
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn overrides_replace_file_values() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), ..Config::default() }.with_overrides(
            env(&[
                (ENV_API_KEY, "ENV_KEY"),
                (ENV_USE_PROXY, "true"),
                (ENV_PROXY_URL, "https://example.test/fn/weather"),
            ]),
        );

        assert_eq!(cfg.api_key(), Some("ENV_KEY"));
        assert!(cfg.use_proxy);
        assert_eq!(cfg.proxy_url, "https://example.test/fn/weather");
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let cfg = Config { api_key: Some("FILE_KEY".into()), use_proxy: true, ..Config::default() }
            .with_overrides(env(&[(ENV_API_KEY, "  "), (ENV_USE_PROXY, "0")]));

        assert_eq!(cfg.api_key(), Some("FILE_KEY"));
        assert!(!cfg.use_proxy);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&tmp.path().join("config.toml")).unwrap();

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_roundtrip_with_partial_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            cache_ttl_ms: Some(1_000),
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), cfg);

        fs::write(&path, "use_proxy = true\n").unwrap();
        let partial = Config::load_from(&path).unwrap();
        assert!(partial.use_proxy);
        assert_eq!(partial.proxy_url, DEFAULT_PROXY_URL);
    }

    #[test]
    fn invalid_file_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "use_proxy = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
