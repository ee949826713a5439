//! Configuration management for localpilot
//!
//! Loads and saves the backend, agent and shell settings from
//! `~/.localpilot/config.json`. Every field has a default, so a missing or
//! partial file is always usable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir};

/// Errors in the configuration layer
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Ask the model to emit its reasoning separately from the answer
    #[serde(default = "default_think")]
    pub think: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            think: default_think(),
            temperature: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "qwen3:0.6b".to_string()
}

fn default_think() -> bool {
    true
}

/// Agent loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDefaults {
    /// Directory that relative tool paths resolve against; the process cwd when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
    /// Number of messages kept after the system prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
    /// Replaces the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            working_dir: None,
            history_limit: default_history_limit(),
            max_tool_rounds: default_max_tool_rounds(),
            system_prompt: None,
        }
    }
}

fn default_history_limit() -> usize {
    20
}

fn default_max_tool_rounds() -> u32 {
    20
}

/// How `run_shell_command` turns a command string into a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShellMode {
    /// Split into an argument vector and exec directly, no interpreter
    #[default]
    Argv,
    /// Hand the whole string to `<program> -c`
    Shell,
}

/// Shell tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub mode: ShellMode,
    #[serde(default = "default_shell_program")]
    pub program: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            mode: ShellMode::default(),
            program: default_shell_program(),
            timeout_secs: None,
        }
    }
}

fn default_shell_program() -> String {
    "sh".to_string()
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub agent: AgentDefaults,
    #[serde(default)]
    pub shell: ShellConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("saving config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Directory the tools operate in
    pub fn working_dir(&self) -> PathBuf {
        match self.agent.working_dir.as_deref() {
            Some(dir) => expand_home(dir),
            None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn model(&self) -> String {
        self.backend.model.clone()
    }

    pub fn history_limit(&self) -> usize {
        self.agent.history_limit
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Write the default config file unless one already exists, then load it
pub async fn init() -> Result<Config> {
    init_at(&config_path()).await
}

/// [`init`] against an explicit path
pub async fn init_at(path: &Path) -> Result<Config> {
    if path.exists() {
        warn!("config already exists at {:?}", path);
    } else {
        Config::default().save_to(path).await?;
        info!("config written to {:?}", path);
    }

    Config::load_from(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/work"), PathBuf::from("/tmp/work"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/projects"), home.join("projects"));
        }
    }

    #[test]
    fn test_working_dir_defaults_to_cwd() {
        let config = Config::default();
        assert_eq!(config.working_dir(), std::env::current_dir().unwrap());
    }
}
