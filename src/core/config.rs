//! Configuration management for procmon.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Environment variable overrides (via the CLI layer)
//! - Validation and defaults

use crate::core::{ProcmonError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete configuration for the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sink configuration
    pub sinks: SinkConfig,
    /// Dispatch buffering configuration
    pub buffering: BufferingConfig,
    /// Process sampling configuration
    pub sampling: SamplingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Global tags applied to every outgoing metric
    pub tags: Vec<GlobalTag>,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// One global key/value tag. Collisions are kept, not deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalTag {
    /// Tag key
    pub key: String,
    /// Tag value
    pub value: String,
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Comma-separated sink URIs, e.g. `stdout://,influxdb-udp://localhost:8089`
    pub spec: String,
    /// Optional measurement prefix used when rendering batches
    pub measurement: Option<String>,
}

/// Dispatch buffering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferingConfig {
    /// Buffer metrics before flushing to sinks
    pub enabled: bool,
    /// Batch capacity in metric count; an automatic flush fires at capacity
    pub capacity: usize,
}

/// Process sampling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Interval between sampling rounds
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Sample CPU usage and context switches
    pub cpu: bool,
    /// Sample resident memory
    pub memory: bool,
    /// Sample per-interface network byte counters
    pub network: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
}

/// Log levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose
    Trace,
    /// Debug information
    Debug,
    /// General information (default)
    Info,
    /// Warnings only
    Warn,
    /// Errors only
    Error,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sinks: SinkConfig::default(),
            buffering: BufferingConfig::default(),
            sampling: SamplingConfig::default(),
            logging: LoggingConfig::default(),
            tags: Vec::new(),
            debug: false,
        }
    }
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            spec: "stdout://".to_string(),
            measurement: None,
        }
    }
}

impl Default for BufferingConfig {
    fn default() -> Self {
        BufferingConfig {
            enabled: false,
            capacity: 128,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            interval: Duration::from_secs(1),
            cpu: true,
            memory: true,
            network: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sinks.spec.trim().is_empty() {
            return Err(ProcmonError::config("sink spec must not be empty"));
        }

        if self.buffering.enabled && self.buffering.capacity == 0 {
            return Err(ProcmonError::config("buffering capacity must be at least 1"));
        }

        // The sampler hard-rejects intervals under 950us; leave headroom.
        if self.sampling.interval < Duration::from_millis(1) {
            return Err(ProcmonError::config(format!(
                "sampling interval must be at least 1ms, got {:?}",
                self.sampling.interval
            )));
        }

        for tag in &self.tags {
            if tag.key.is_empty() {
                return Err(ProcmonError::config("global tag keys must not be empty"));
            }
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| ProcmonError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Set the sink spec string
    pub fn sinks<S: Into<String>>(mut self, spec: S) -> Self {
        self.config.sinks.spec = spec.into();
        self
    }

    /// Set the measurement prefix
    pub fn measurement<S: Into<String>>(mut self, measurement: S) -> Self {
        self.config.sinks.measurement = Some(measurement.into());
        self
    }

    /// Enable buffering with the given capacity
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffering.enabled = true;
        self.config.buffering.capacity = capacity;
        self
    }

    /// Set the sampling interval
    pub fn sampling_interval(mut self, interval: Duration) -> Self {
        self.config.sampling.interval = interval;
        self
    }

    /// Append a global tag
    pub fn global_tag<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.config.tags.push(GlobalTag {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
