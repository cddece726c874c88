//! CLI configuration: a TOML file plus environment overrides for secrets.

use std::path::Path;
use std::time::Duration;

use openx_oauth::{ClientBuilder, OpenXClient, ProxyConfig};
use serde::Deserialize;

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "openx.toml";

/// Overrides `api_secret` from the file.
pub const API_SECRET_ENV: &str = "OPENX_API_SECRET";
/// Overrides `password` from the file.
pub const PASSWORD_ENV: &str = "OPENX_PASSWORD";

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required field '{field}' (set it in the config file or via {env_var})")]
    MissingSecret { field: String, env_var: String },
}

/// Optional `[proxy]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySection {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_proxy_scheme")]
    pub scheme: String,
}

fn default_proxy_scheme() -> String {
    "http".to_string()
}

/// Contents of `openx.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenXConfig {
    pub api_key: String,
    #[serde(default)]
    pub api_secret: Option<String>,
    pub login_url: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    pub domain: String,
    /// `/ox/3.0/a/` or `/ox/4.0/`; the library default when absent.
    #[serde(default)]
    pub path: Option<String>,
    pub request_token_url: String,
    pub access_token_url: String,
    #[serde(default)]
    pub authorize_url: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub callback: Option<String>,
    #[serde(default)]
    pub proxy: Option<ProxySection>,
    #[serde(default)]
    pub ignore_ssl_certificate: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl OpenXConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read the file and apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let config = Self::from_toml(&contents)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config.with_env_overrides(|name| std::env::var(name).ok()))
    }

    /// Replace secrets with values found through `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secret) = lookup(API_SECRET_ENV).filter(|v| !v.is_empty()) {
            self.api_secret = Some(secret);
        }
        if let Some(password) = lookup(PASSWORD_ENV).filter(|v| !v.is_empty()) {
            self.password = Some(password);
        }
        self
    }

    /// Translate into a client builder. Field validation is left to the
    /// builder; only secrets that were never supplied are reported here.
    pub fn client_builder(&self) -> Result<ClientBuilder> {
        let api_secret = require_secret(&self.api_secret, "api_secret", API_SECRET_ENV)?;
        let password = require_secret(&self.password, "password", PASSWORD_ENV)?;

        let mut builder = OpenXClient::builder()
            .api_key(self.api_key.trim())
            .api_secret(api_secret)
            .login_url(self.login_url.trim())
            .credentials(self.username.trim(), password)
            .domain(self.domain.trim())
            .request_token_url(self.request_token_url.trim())
            .access_token_url(self.access_token_url.trim())
            .insecure_tls(self.ignore_ssl_certificate);

        if let Some(path) = &self.path {
            builder = builder.path(path.trim());
        }
        if let Some(url) = &self.authorize_url {
            builder = builder.authorize_url(url.trim());
        }
        if let Some(scope) = &self.scope {
            builder = builder.scope(scope.as_str());
        }
        if let Some(callback) = &self.callback {
            builder = builder.callback(callback.trim());
        }
        if let Some(proxy) = &self.proxy {
            builder = builder
                .proxy(ProxyConfig::new(proxy.host.as_str(), proxy.port).with_scheme(proxy.scheme.as_str()));
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder)
    }
}

fn require_secret(value: &Option<String>, field: &str, env_var: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingSecret {
            field: field.to_string(),
            env_var: env_var.to_string(),
        })
}
