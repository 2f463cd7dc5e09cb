//! Client configuration.
//!
//! Loads from TOML, from `JELLYFIN_*` environment variables, or both (the
//! environment wins). Everything here is read-only once an `ApiClient` has
//! been built from it.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_BASE_URI: &str = "JELLYFIN_BASE_URI";
pub const ENV_READ_TIMEOUT_MS: &str = "JELLYFIN_READ_TIMEOUT_MS";
pub const ENV_TOKEN: &str = "JELLYFIN_TOKEN";

/// Shared settings for every call made through one `ApiClient`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host, port and optional base path, e.g. `http://nas:8096/jellyfin`.
    pub base_uri: String,

    /// Per-request timeout. No timeout when unset.
    pub read_timeout_ms: Option<u64>,

    pub user_agent: Option<String>,

    /// Sent with every request, before per-call headers.
    pub default_headers: BTreeMap<String, String>,

    pub auth: Option<AuthConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost".to_string(),
            read_timeout_ms: None,
            user_agent: None,
            default_headers: BTreeMap::new(),
            auth: None,
        }
    }
}

/// Identity sent in the `MediaBrowser` authorization header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub client: String,
    pub device: String,
    pub device_id: String,
    pub version: String,
    pub token: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client: "jellyfin-api-core".to_string(),
            device: "jellyfin-api-core".to_string(),
            device_id: "jellyfin-api-core".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env(|name| std::env::var(name).ok())
    }

    /// Apply `JELLYFIN_*` overrides read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(base_uri) = lookup(ENV_BASE_URI) {
            self.base_uri = base_uri;
        }
        if let Some(raw) = lookup(ENV_READ_TIMEOUT_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::Env {
                name: ENV_READ_TIMEOUT_MS,
                value: raw.clone(),
            })?;
            self.read_timeout_ms = Some(ms);
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.auth.get_or_insert_with(AuthConfig::default).token = Some(token);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    /// Base URI without a trailing slash.
    pub fn normalized_base_uri(&self) -> &str {
        self.base_uri.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_ms == Some(0) {
            return Err(ConfigError::ZeroReadTimeout);
        }
        let uri = self.base_uri.trim();
        let has_scheme = uri.starts_with("http://") || uri.starts_with("https://");
        let has_host = uri
            .split_once("://")
            .is_some_and(|(_, rest)| !rest.trim_start_matches('/').is_empty());
        if has_scheme && has_host {
            Ok(())
        } else {
            Err(ConfigError::BaseUri(self.base_uri.clone()))
        }
    }
}
