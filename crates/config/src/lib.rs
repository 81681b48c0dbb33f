//! Configuration loading, validation, and management for SchemeFinder.
//!
//! Loads configuration from `~/.schemefinder/config.toml` with environment
//! variable overrides. Validates all settings at startup.
//!
//! There is no built-in API key: a credential only ever comes
//! from the config file, the environment, or the caller.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.schemefinder/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Max output tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// System instruction constraining the model to structured output
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Ordered transport strategies
    #[serde(default)]
    pub transport: TransportConfig,

    /// HTTP gateway (relay + eligibility endpoint)
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".into()
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_temperature() -> f32 {
    0.5
}
fn default_system_prompt() -> String {
    "You are a government scheme eligibility expert. Return only valid JSON with schemes that match the criteria.".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("system_prompt", &self.system_prompt)
            .field("transport", &self.transport)
            .field("gateway", &self.gateway)
            .finish()
    }
}

/// The ordered list of strategies the transport chain walks through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }
}

/// One transport strategy, tagged by `kind` in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Through the trusted relay, which injects the protocol-version header.
    Relay {
        #[serde(default = "default_relay_url")]
        url: String,
        #[serde(default = "default_relay_timeout")]
        timeout_secs: u64,
    },
    /// Straight to the provider with a bounded wait.
    Direct {
        #[serde(default = "default_upstream_url")]
        base_url: String,
        #[serde(default = "default_direct_timeout")]
        timeout_secs: u64,
    },
    /// Blocking HTTP client run off the async runtime.
    Legacy {
        #[serde(default = "default_upstream_url")]
        base_url: String,
        #[serde(default = "default_legacy_timeout")]
        timeout_secs: u64,
    },
}

impl StrategyConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            StrategyConfig::Relay { .. } => "relay",
            StrategyConfig::Direct { .. } => "direct",
            StrategyConfig::Legacy { .. } => "legacy",
        }
    }

    pub fn timeout_secs(&self) -> u64 {
        match self {
            StrategyConfig::Relay { timeout_secs, .. }
            | StrategyConfig::Direct { timeout_secs, .. }
            | StrategyConfig::Legacy { timeout_secs, .. } => *timeout_secs,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            StrategyConfig::Relay { url, .. } => url,
            StrategyConfig::Direct { base_url, .. } | StrategyConfig::Legacy { base_url, .. } => {
                base_url
            }
        }
    }
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8787/v1/relay".into()
}
fn default_upstream_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_relay_timeout() -> u64 {
    30
}
fn default_direct_timeout() -> u64 {
    10
}
fn default_legacy_timeout() -> u64 {
    60
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::Relay {
            url: default_relay_url(),
            timeout_secs: default_relay_timeout(),
        },
        StrategyConfig::Direct {
            base_url: default_upstream_url(),
            timeout_secs: default_direct_timeout(),
        },
        StrategyConfig::Legacy {
            base_url: default_upstream_url(),
            timeout_secs: default_legacy_timeout(),
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Where the relay forwards requests (`/v1/messages` is appended)
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    #[serde(default = "default_upstream_timeout")]
    pub upstream_timeout_secs: u64,
}

fn default_port() -> u16 {
    8787
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_upstream_timeout() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            upstream_url: default_upstream_url(),
            upstream_timeout_secs: default_upstream_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.schemefinder/config.toml).
    ///
    /// Also checks environment variables:
    /// - `SCHEMEFINDER_API_KEY`, then `ANTHROPIC_API_KEY` (only if the file has no key)
    /// - `SCHEMEFINDER_MODEL`
    /// - `SCHEMEFINDER_RELAY_URL` (rewrites every relay strategy)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("SCHEMEFINDER_API_KEY").or_else(|| non_empty("ANTHROPIC_API_KEY"));
        }

        if let Some(model) = non_empty("SCHEMEFINDER_MODEL") {
            self.model = model;
        }

        if let Some(relay_url) = non_empty("SCHEMEFINDER_RELAY_URL") {
            for strategy in &mut self.transport.strategies {
                if let StrategyConfig::Relay { url, .. } = strategy {
                    *url = relay_url.clone();
                }
            }
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".schemefinder")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError("max_tokens must be > 0".into()));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if self.transport.strategies.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one transport strategy is required".into(),
            ));
        }

        for (i, strategy) in self.transport.strategies.iter().enumerate() {
            if strategy.timeout_secs() == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "transport.strategies[{i}] ({}) timeout_secs must be > 0",
                    strategy.kind()
                )));
            }
            if strategy.url().trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "transport.strategies[{i}] ({}) url must not be empty",
                    strategy.kind()
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            system_prompt: default_system_prompt(),
            transport: TransportConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
