//! Configuration management for codex-duel
//!
//! Supports environment variables, a config file, and CLI overrides.
//! `Config` is the mutable layer assembled at startup; `RelayConfig` is the
//! validated snapshot a single run is driven by.
//!
//! Config file location: ~/.config/codex-duel/config.toml

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{DuelError, Result};
use crate::core::types::AgentRole;

/// Default number of round-trips
pub const DEFAULT_TURNS: usize = 10;

/// Default transcript destination, relative to the working directory
pub const DEFAULT_LOG_PATH: &str = "codex_duel_transcript.md";

/// Default agent program
pub const DEFAULT_PROGRAM: &str = "codex";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Relay defaults
    #[serde(default)]
    pub relay: RelaySettings,
    /// Per-role models
    #[serde(default)]
    pub models: ModelConfig,
    /// Agent executor backend
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Relay defaults that CLI flags may override
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Round-trips per run
    pub turns: usize,
    /// Where the transcript is written
    pub log_path: PathBuf,
}

/// Model identifiers per role; `None` uses the backend's default model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_a: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_b: Option<String>,
}

/// Local inference provider for the OSS backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocalProvider {
    Ollama,
    Lmstudio,
}

impl LocalProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Lmstudio => "lmstudio",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Some(Self::Ollama),
            "lmstudio" => Some(Self::Lmstudio),
            _ => None,
        }
    }
}

/// How the executor retrieves the agent's final utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OutputCapture {
    /// Read the process's stdout
    #[default]
    Stdout,
    /// Ask the agent to write its last message to a temp file and read that
    LastMessageFile,
}

/// Agent executor backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Agent program to launch
    pub program: String,
    /// Use a local open-source model provider
    pub oss: bool,
    /// Which local provider (only meaningful with `oss`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_provider: Option<LocalProvider>,
    /// Output retrieval mode
    #[serde(default)]
    pub capture: OutputCapture,
    /// Per-invocation timeout; unset waits indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            turns: env::var("CODEX_DUEL_TURNS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(DEFAULT_TURNS),
            log_path: env::var("CODEX_DUEL_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_PATH)),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            agent_a: env::var("CODEX_DUEL_MODEL_A").ok().filter(|m| !m.is_empty()),
            agent_b: env::var("CODEX_DUEL_MODEL_B").ok().filter(|m| !m.is_empty()),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            program: env::var("CODEX_DUEL_PROGRAM").unwrap_or_else(|_| DEFAULT_PROGRAM.to_string()),
            oss: env::var("CODEX_DUEL_OSS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            local_provider: env::var("CODEX_DUEL_LOCAL_PROVIDER")
                .ok()
                .and_then(|p| LocalProvider::parse(&p)),
            capture: OutputCapture::default(),
            timeout_secs: None,
        }
    }
}

impl BackendSettings {
    /// Built-in settings, ignoring the environment
    pub fn builtin() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            oss: false,
            local_provider: None,
            capture: OutputCapture::default(),
            timeout_secs: None,
        }
    }

    /// The local provider that will actually be forwarded to the agent.
    ///
    /// A provider without the OSS toggle is ignored.
    pub fn effective_local_provider(&self) -> Option<LocalProvider> {
        if self.oss {
            self.local_provider
        } else {
            None
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codex-duel")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        match Self::load_from(&Self::config_file()) {
            Ok(config) => config,
            Err(e) => {
                if Self::config_exists() {
                    tracing::warn!("ignoring config file: {}", e);
                }
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DuelError::config("Config file not found"));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| DuelError::config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| DuelError::config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to the default file and return its path
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_file();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| DuelError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| DuelError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| DuelError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Freeze this configuration into a run snapshot
    pub fn relay_config(&self, seed: impl Into<String>, working_dir: PathBuf) -> Result<RelayConfig> {
        Ok(RelayConfig::new(seed, self.relay.turns)?
            .with_models(self.models.clone())
            .with_backend(self.backend.clone())
            .with_log_path(self.relay.log_path.clone())
            .with_working_dir(working_dir))
    }
}

/// Immutable configuration for one relay run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    total_round_trips: usize,
    seed: String,
    models: ModelConfig,
    backend: BackendSettings,
    log_path: PathBuf,
    working_dir: PathBuf,
}

impl RelayConfig {
    /// Create a run snapshot; the seed must be non-empty and at least one
    /// round-trip requested
    pub fn new(seed: impl Into<String>, total_round_trips: usize) -> Result<Self> {
        let seed = seed.into();
        if seed.trim().is_empty() {
            return Err(DuelError::config("seed topic must not be empty"));
        }
        if total_round_trips == 0 {
            return Err(DuelError::config("turns must be at least 1"));
        }

        Ok(Self {
            total_round_trips,
            seed,
            models: ModelConfig {
                agent_a: None,
                agent_b: None,
            },
            backend: BackendSettings::builtin(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            working_dir: PathBuf::from("."),
        })
    }

    pub fn with_models(mut self, models: ModelConfig) -> Self {
        self.models = models;
        self
    }

    pub fn with_backend(mut self, backend: BackendSettings) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn total_round_trips(&self) -> usize {
        self.total_round_trips
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Model for a role, if one was configured
    pub fn model_for(&self, role: AgentRole) -> Option<&str> {
        match role {
            AgentRole::A => self.models.agent_a.as_deref(),
            AgentRole::B => self.models.agent_b.as_deref(),
        }
    }

    pub fn backend(&self) -> &BackendSettings {
        &self.backend
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_config_validation() {
        assert!(matches!(
            RelayConfig::new("   ", 3),
            Err(DuelError::Config(_))
        ));
        assert!(matches!(
            RelayConfig::new("discuss X", 0),
            Err(DuelError::Config(_))
        ));

        let config = RelayConfig::new("discuss X", 2).unwrap();
        assert_eq!(config.total_round_trips(), 2);
        assert_eq!(config.seed(), "discuss X");
        assert_eq!(config.log_path(), Path::new(DEFAULT_LOG_PATH));
    }

    #[test]
    fn test_model_for_role() {
        let config = RelayConfig::new("topic", 1).unwrap().with_models(ModelConfig {
            agent_a: Some("gpt-a".to_string()),
            agent_b: None,
        });
        assert_eq!(config.model_for(AgentRole::A), Some("gpt-a"));
        assert_eq!(config.model_for(AgentRole::B), None);
    }

    #[test]
    fn test_local_provider_requires_oss() {
        let mut backend = BackendSettings {
            program: "codex".to_string(),
            oss: false,
            local_provider: Some(LocalProvider::Ollama),
            capture: OutputCapture::Stdout,
            timeout_secs: None,
        };
        assert_eq!(backend.effective_local_provider(), None);

        backend.oss = true;
        assert_eq!(backend.effective_local_provider(), Some(LocalProvider::Ollama));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.relay.turns = 4;
        config.backend.capture = OutputCapture::LastMessageFile;
        config.backend.local_provider = Some(LocalProvider::Lmstudio);
        config.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("last-message-file"));
        assert!(content.contains("lmstudio"));

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.relay.turns, 4);
        assert_eq!(loaded.backend, config.backend);
    }

    #[test]
    fn test_partial_config_file() {
        let config: Config = toml::from_str("[relay]\nturns = 3\nlog_path = \"out.md\"\n").unwrap();
        assert_eq!(config.relay.turns, 3);
        assert_eq!(config.relay.log_path, PathBuf::from("out.md"));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str(
            "[relay]\nturns = 3\nlog_path = \"out.md\"\n\n[backend]\noss = true\n",
        )
        .unwrap();
        assert_eq!(config.relay.turns, 3);
        assert!(config.backend.oss);
        assert!(!config.backend.program.is_empty());
        assert_eq!(config.backend.capture, OutputCapture::Stdout);

        let config: Config = toml::from_str("[relay]\nturns = 7\n").unwrap();
        assert_eq!(config.relay.turns, 7);
        assert!(!config.relay.log_path.as_os_str().is_empty());
    }

    #[test]
    fn test_partial_file_is_not_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[backend]\noss = true\n\n[relay]\nturns = 3\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.relay.turns, 3);
        assert!(loaded.backend.oss);
    }

    #[test]
    fn test_relay_config_uses_builtin_backend() {
        let config = RelayConfig::new("topic", 1).unwrap();
        assert_eq!(config.backend(), &BackendSettings::builtin());
        assert_eq!(config.backend().program, DEFAULT_PROGRAM);
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("codex-duel"));
    }
}
