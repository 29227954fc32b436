use serde::{Deserialize, Serialize};

use super::checklist::ChecklistKind;

/// Configuration from muster.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Which backend serves templates and options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON files in `data_dir`
    #[default]
    File,
    /// Remote HTTP API at `base_url`
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub backend: Backend,
    /// Data directory for the file backend, relative to the config file
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the HTTP backend
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            backend: Backend::File,
            data_dir: default_data_dir(),
            base_url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_kind")]
    pub default_kind: ChecklistKind,
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Reload automatically when the file backend's data changes
    #[serde(default = "default_true")]
    pub watch: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            default_kind: default_kind(),
            tick_rate_ms: default_tick_rate_ms(),
            watch: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "muster=debug"
    #[serde(default)]
    pub level: Option<String>,
    /// Log file for the TUI, relative to the config file
    #[serde(default)]
    pub file: Option<String>,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_kind() -> ChecklistKind {
    ChecklistKind::Onboarding
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}
