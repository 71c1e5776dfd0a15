//! Engine configuration data structures

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound accepted for `max_transitions`
const MAX_TRANSITIONS_LIMIT: u32 = 10_000;

/// Logging level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfiguration {
    /// Transitions allowed within a single request before the graph is declared non-terminating
    pub max_transitions: u32,
    /// Refuse to build an engine whose graph has validation errors
    pub strict_validation: bool,
    /// Logging verbosity level
    pub log_level: LogLevel,
    /// Location of the JSON journey store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for EngineConfiguration {
    fn default() -> Self {
        Self {
            max_transitions: 64,
            strict_validation: false,
            log_level: LogLevel::Info,
            store_path: None,
        }
    }
}

impl EngineConfiguration {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: EngineConfiguration = toml::from_str(&content)?;
            Ok(config)
        } else {
            // Return default configuration if file doesn't exist
            Ok(EngineConfiguration::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("journey").join("config.toml"))
    }

    /// Default JSON journey store location under the user data directory
    pub fn default_store_path() -> anyhow::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(data_dir.join("journey").join("journeys.json"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.max_transitions == 0 {
            errors.push("max_transitions must be at least 1".to_string());
        }
        if self.max_transitions > MAX_TRANSITIONS_LIMIT {
            errors.push(format!(
                "max_transitions cannot exceed {}",
                MAX_TRANSITIONS_LIMIT
            ));
        }

        if let Some(path) = &self.store_path {
            if path.as_os_str().is_empty() {
                errors.push("store_path cannot be empty".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
