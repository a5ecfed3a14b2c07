//! Configuration management for Troupe
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/troupe/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, TroupeError};

/// Main configuration for Troupe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model backend configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Rate limiting configuration
    #[serde(default)]
    pub limits: LimitConfig,
    /// Agent service queue configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// Workspace configuration for file tools
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Agent the CLI talks to when none is named
    #[serde(default = "default_agent_name")]
    pub default_agent: String,
}

fn default_agent_name() -> String {
    "Manager".to_string()
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Requested MSN (`service[/model[/flags]]`); the backend default is
    /// used when absent
    pub msn: Option<String>,
    /// Maximum tokens the model may generate per turn
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Rolling-window rate limit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitConfig {
    /// Token budget over the trailing 60 seconds
    pub tokens_per_minute: u32,
}

/// Overflow policy for a bounded service inbound queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Suspend the sender until space is available
    Block,
    /// Fail the send immediately when the queue is full
    Reject,
}

/// Agent service queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Inbound/outbound queue capacity per agent service
    pub queue_capacity: usize,
    /// What to do when a bounded inbound queue is full
    pub overflow: OverflowPolicy,
    /// Maximum depth of the inter-agent invocation chain
    pub max_call_depth: usize,
}

/// Workspace configuration for file-oriented tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory file tools resolve relative paths against
    pub root: PathBuf,
    /// Skip the interactive confirmation before executing commands
    pub auto_approve_commands: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            limits: LimitConfig::default(),
            service: ServiceConfig::default(),
            workspace: WorkspaceConfig::default(),
            default_agent: default_agent_name(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            msn: env::var("TROUPE_MSN").ok(),
            max_tokens: env::var("MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8192),
            timeout_secs: 120,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            tokens_per_minute: env::var("TROUPE_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(40_000),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            overflow: OverflowPolicy::Block,
            max_call_depth: 8,
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: env::var("TROUPE_WORKSPACE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            auto_approve_commands: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("troupe")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Load .env and .env.secret if present
        let _ = dotenvy::dotenv();
        let _ = dotenvy::from_filename(".env.secret");

        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(TroupeError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| TroupeError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TroupeError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.tokens_per_minute, 40_000);
        assert_eq!(config.service.queue_capacity, 32);
        assert_eq!(config.service.overflow, OverflowPolicy::Block);
        assert_eq!(config.service.max_call_depth, 8);
        assert_eq!(config.default_agent, "Manager");
    }

    #[test]
    fn test_config_dir() {
        let dir = Config::config_dir();
        assert!(dir.to_string_lossy().contains("troupe"));
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [model]
            msn = "anthropic/claude-3-5-sonnet-20240620"
            max_tokens = 4096
            timeout_secs = 60

            [service]
            queue_capacity = 4
            overflow = "reject"
            max_call_depth = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.service.overflow, OverflowPolicy::Reject);
        // omitted sections fall back to defaults
        assert_eq!(config.limits.tokens_per_minute, 40_000);
    }
}
