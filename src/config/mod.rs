// Server configuration

mod loader;

pub use loader::ConfigLoader;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, one table per concern
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Bearer token required on `/api/*` and `/ws/*` when set
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_bind() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3420 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_origins: Vec::new(),
            auth_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionsConfig {
    /// Persist sessions as JSON files under this directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Reject progress updates that go backwards instead of logging them
    #[serde(default)]
    pub enforce_monotonic_progress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventsConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

fn default_channel_capacity() -> usize { 256 }
fn default_keep_alive_secs() -> u64 { 15 }

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Pause between stub agent steps
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
}

fn default_step_delay_ms() -> u64 { 250 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsConfig {
    #[serde(default = "default_max_samples")]
    pub max_samples_per_operation: usize,
}

fn default_max_samples() -> usize { 1000 }

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_samples_per_operation: default_max_samples(),
        }
    }
}

impl AppConfig {
    /// Check value ranges after loading and after CLI overrides
    pub fn validate(&self) -> Result<()> {
        if self.server.bind.trim().is_empty() {
            return Err(anyhow!("server.bind cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be greater than 0"));
        }
        if let Some(token) = &self.server.auth_token {
            if token.trim().is_empty() {
                return Err(anyhow!("server.auth_token cannot be blank"));
            }
        }
        if self.events.channel_capacity == 0 {
            return Err(anyhow!("events.channel_capacity must be greater than 0"));
        }
        if self.events.keep_alive_secs == 0 {
            return Err(anyhow!("events.keep_alive_secs must be greater than 0"));
        }
        if self.metrics.max_samples_per_operation == 0 {
            return Err(anyhow!("metrics.max_samples_per_operation must be greater than 0"));
        }
        Ok(())
    }
}
