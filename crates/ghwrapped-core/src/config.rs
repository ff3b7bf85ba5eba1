use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;

pub const ENDPOINT_ENV: &str = "GHWRAPPED_API_URL";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const TIMEOUT_ENV: &str = "GHWRAPPED_TIMEOUT_SECS";

/// Optional `config.toml` contents; every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Read a config file, treating a missing or invalid file as empty.
    pub fn read(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), "ignoring unparsable config file: {}", e);
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// `<config_dir>/ghwrapped/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ghwrapped").join("config.toml"))
    }

    /// Resolve from the process environment and the default config file.
    pub fn load() -> Self {
        let file = Self::config_path()
            .map(|path| ConfigFile::read(&path))
            .unwrap_or_default();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Environment wins over the file, the file wins over defaults.
    pub fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let endpoint = non_empty(env(ENDPOINT_ENV))
            .or(non_empty(file.endpoint))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let token = non_empty(env(TOKEN_ENV)).or(non_empty(file.token));

        let timeout_secs = env(TIMEOUT_ENV)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);

        Self {
            endpoint,
            token,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Apply command-line overrides on top of the resolved values.
    pub fn with_overrides(mut self, endpoint: Option<String>, token: Option<String>) -> Self {
        if let Some(endpoint) = non_empty(endpoint) {
            self.endpoint = endpoint;
        }
        if let Some(token) = non_empty(token) {
            self.token = Some(token);
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
