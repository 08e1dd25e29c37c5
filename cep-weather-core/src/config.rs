use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::Path, path::PathBuf, time::Duration};

use crate::provider::ProviderId;

/// Read from the working directory by [`Config::load`].
pub const DOTENV_FILE: &str = ".env";

/// Parse a `.env` file into a map without touching the process environment.
/// A missing file yields an empty map.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?;

    iter.map(|item| {
        item.with_context(|| format!("Failed to parse env file: {}", path.display()))
    })
    .collect()
}

/// Configuration for a single provider (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
}

/// Server configuration: TOML file, then environment on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Budget for the whole postal → geocode → temperature chain.
    pub lookup_timeout_secs: u64,
    /// Per-request timeout of the shared HTTP client.
    pub http_timeout_secs: u64,

    /// Example TOML:
    /// [providers.openweather]
    /// api_key = "..."
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            lookup_timeout_secs: 5,
            http_timeout_secs: 10,
            providers: HashMap::new(),
        }
    }
}

impl Config {
    /// Load configuration for the server.
    ///
    /// An explicit `path` must exist. Without one, the platform config file is
    /// read if present. Environment variables override both; a `.env` file in
    /// the working directory fills in whatever the process environment lacks.
    /// The result is validated so a missing credential fails at startup.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::config_file_path()?;
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };

        let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
        cfg.apply_env(|key| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| dotenv.get(key).cloned())
        })?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Overlay `PORT` and the provider key variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{port}'"))?;
        }

        for id in ProviderId::all() {
            if let Some(key) = var(id.env_var()) {
                self.upsert_provider_api_key(*id, key);
            }
        }

        Ok(())
    }

    /// Every credentialed provider must have a key, and no unknown
    /// provider sections may be present.
    pub fn validate(&self) -> Result<()> {
        for name in self.providers.keys() {
            ProviderId::try_from(name.as_str())
                .with_context(|| format!("Invalid [providers.{name}] section"))?;
        }
        for id in ProviderId::all() {
            self.require_api_key(*id)?;
        }
        Ok(())
    }

    /// Path to the default config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cep-weather", "cep-weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn upsert_provider_api_key(&mut self, provider_id: ProviderId, api_key: String) {
        self.providers.insert(provider_id.as_str().to_string(), ProviderConfig { api_key });
    }

    /// Returns API key for a provider, if present.
    pub fn provider_api_key(&self, provider_id: ProviderId) -> Option<&str> {
        self.providers
            .get(provider_id.as_str())
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn require_api_key(&self, provider_id: ProviderId) -> Result<&str> {
        self.provider_api_key(provider_id).ok_or_else(|| {
            anyhow!(
                "{} is required. Please set it in the environment, in {}, or under \
                 [providers.{}] in the config file",
                provider_id.env_var(),
                DOTENV_FILE,
                provider_id
            )
        })
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
