use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    cache::{DEFAULT_MAX_DISK_BYTES, DEFAULT_SEARCH_TTL, DEFAULT_WEATHER_TTL},
    clothing::{ColdSensitivity, Style},
    provider::ProviderId,
};

/// Overrides the OpenWeather API key from the config file.
pub const API_KEY_ENV: &str = "SKYCAST_API_KEY";

/// Per-provider credentials and endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint; required for `proxy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub style: Style,
    pub cold_sensitivity: ColdSensitivity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub weather_ttl_secs: u64,
    pub search_ttl_secs: u64,
    pub max_disk_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            weather_ttl_secs: DEFAULT_WEATHER_TTL.as_secs(),
            search_ttl_secs: DEFAULT_SEARCH_TTL.as_secs(),
            max_disk_bytes: DEFAULT_MAX_DISK_BYTES,
        }
    }
}

impl CacheConfig {
    pub fn weather_ttl(&self) -> Duration {
        Duration::from_secs(self.weather_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}

/// Everything `skycast` persists between runs.
///
/// Example TOML:
/// ```toml
/// default_provider = "openweather"
/// default_city = "Beijing"
///
/// [providers.openweather]
/// api_key = "..."
///
/// [preferences]
/// style = "sporty"
/// cold_sensitivity = "cold"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Optional default provider id, e.g. "openweather" or "proxy".
    pub default_provider: Option<String>,

    /// City used when a command is run without one.
    pub default_city: Option<String>,

    /// Language code passed to the provider for condition descriptions.
    pub language: String,

    pub providers: HashMap<String, ProviderConfig>,

    pub preferences: Preferences,

    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: None,
            default_city: None,
            language: "en".to_string(),
            providers: HashMap::new(),
            preferences: Preferences::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Provider used when none is named on the command line.
    pub fn default_provider_id(&self) -> Result<ProviderId> {
        match self.default_provider.as_deref() {
            Some(name) => ProviderId::try_from(name),
            None => Err(anyhow!(
                "No default provider configured.\n\
                 Hint: run `skycast configure openweather` (or `skycast configure proxy`) first."
            )),
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    pub fn set_default_provider(&mut self, id: ProviderId) {
        self.default_provider = Some(id.to_string());
    }

    /// Config from the platform location; defaults on first run.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read config file: {}", path.display()));
            }
        };

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Write as TOML, creating missing parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| anyhow!("Config path has no parent: {}", path.display()))?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;

        let body = toml::to_string_pretty(self).context("Failed to encode configuration as TOML")?;
        fs::write(path, body)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// `config.toml` under the platform config dir, e.g. `~/.config/skycast`.
    pub fn config_file_path() -> Result<PathBuf> {
        ProjectDirs::from("dev", "skycast", "skycast")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Apply process environment overrides. Nothing is written back to disk.
    pub fn apply_env(&mut self) {
        self.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("using OpenWeather API key from {API_KEY_ENV}");
            self.entry(ProviderId::OpenWeather).api_key = Some(key);
            self.default_if_unset(ProviderId::OpenWeather);
        }
    }

    /// Store a key; the provider also becomes the default if there is none yet.
    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.entry(provider_id).api_key = Some(api_key);
        self.default_if_unset(provider_id);
    }

    /// Store an endpoint; same defaulting rule as the key.
    pub fn upsert_provider_base_url(&mut self, provider_id: ProviderId, base_url: String) {
        self.entry(provider_id).base_url = Some(base_url);
        self.default_if_unset(provider_id);
    }

    fn entry(&mut self, provider_id: ProviderId) -> &mut ProviderConfig {
        self.providers.entry(provider_id.as_str().to_string()).or_default()
    }

    fn default_if_unset(&mut self, provider_id: ProviderId) {
        self.default_provider.get_or_insert_with(|| provider_id.to_string());
    }

    /// Non-empty key for `provider_id`.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)?
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
    }

    pub fn provider_base_url(&self, provider_id: ProviderId) -> Option<&str> {
        self.provider_config(provider_id)?
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
    }

    /// Whether `provider_from_config` has what it needs for `provider_id`.
    pub fn is_provider_configured(&self, provider_id: ProviderId) -> bool {
        if provider_id.needs_api_key() {
            self.provider_api_key(provider_id).is_some()
        } else {
            self.provider_base_url(provider_id).is_some()
        }
    }
}
