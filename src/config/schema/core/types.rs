use crate::config::schema::diary::ensure;
use crate::config::schema::{DiaryConfig, ObservabilityConfig, StoreConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace directory - computed from home, not serialized
    #[serde(skip)]
    pub workspace_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub default_provider: Option<String>,
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,

    #[serde(default)]
    pub diary: DiaryConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub reliability: ReliabilityConfig,
}

fn default_temperature() -> f64 {
    0.7
}

pub const DEFAULT_PROVIDER: &str = "openrouter";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("."),
            config_path: PathBuf::from("config.toml"),
            api_key: None,
            default_provider: Some(DEFAULT_PROVIDER.to_string()),
            default_model: Some(DEFAULT_MODEL.to_string()),
            default_temperature: default_temperature(),
            diary: DiaryConfig::default(),
            store: StoreConfig::default(),
            observability: ObservabilityConfig::default(),
            reliability: ReliabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn provider_name(&self) -> &str {
        self.default_provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    pub fn model_name(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure((0.0..=2.0).contains(&self.default_temperature), || {
            format!(
                "default_temperature must be within [0, 2], got {}",
                self.default_temperature
            )
        })?;
        self.diary.validate()
    }
}

// ── Reliability ───────────────────────────────────────────────────

/// Restart policy for supervised daemon components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReliabilityConfig {
    #[serde(default = "default_initial_backoff_secs")]
    pub component_initial_backoff_secs: u64,
    #[serde(default = "default_max_backoff_secs")]
    pub component_max_backoff_secs: u64,
    /// 0 disables the restart limit.
    #[serde(default = "default_max_restarts")]
    pub component_max_restarts: u32,
}

fn default_initial_backoff_secs() -> u64 {
    2
}

fn default_max_backoff_secs() -> u64 {
    60
}

fn default_max_restarts() -> u32 {
    10
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            component_initial_backoff_secs: default_initial_backoff_secs(),
            component_max_backoff_secs: default_max_backoff_secs(),
            component_max_restarts: default_max_restarts(),
        }
    }
}
