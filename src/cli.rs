//! Command-line interface for procmon.
//!
//! Runs the sampling loop against the configured sinks. Configuration
//! precedence: CLI arguments, then environment variables, then the YAML
//! config file, then defaults.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::agent::Agent;
use crate::core::config::GlobalTag;
use crate::core::{Config, ConfigBuilder, ProcmonError, Result};

/// Lightweight process-telemetry agent
#[derive(Parser, Debug)]
#[command(name = "procmon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Comma-separated sink URIs (stdout://, influxdb-udp://host:port, discard://)
    #[arg(long, env = "PROCMON_SINKS")]
    pub sinks: Option<String>,

    /// Measurement prefix for metric names
    #[arg(long, env = "PROCMON_MEASUREMENT")]
    pub measurement: Option<String>,

    /// Sampling interval (e.g. 500ms, 2s)
    #[arg(long, env = "PROCMON_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Buffer metrics and flush in batches of this size
    #[arg(long, env = "PROCMON_BUFFER")]
    pub buffer: Option<usize>,

    /// Global tag as key=value; may be repeated
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,

    /// Configuration file path
    #[arg(short, long, env = "PROCMON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "PROCMON_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        if let Some(path) = &self.config {
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                ProcmonError::config(format!("Failed to read config file {:?}: {}", path, e))
            })?;
            builder = builder.from_yaml(&content)?;
            tracing::debug!("loaded configuration from {:?}", path);
        }

        let mut config = builder.build()?;
        self.apply_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) -> Result<()> {
        if let Some(sinks) = &self.sinks {
            config.sinks.spec = sinks.clone();
        }
        if let Some(measurement) = &self.measurement {
            config.sinks.measurement = Some(measurement.clone());
        }
        if let Some(interval) = self.interval {
            config.sampling.interval = interval;
        }
        if let Some(capacity) = self.buffer {
            config.buffering.enabled = true;
            config.buffering.capacity = capacity;
        }
        for tag in &self.tags {
            let (key, value) = tag.split_once('=').ok_or_else(|| {
                ProcmonError::config(format!("tag '{}' is not of the form key=value", tag))
            })?;
            config.tags.push(GlobalTag {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        config.debug = self.debug;
        Ok(())
    }
}

/// Initializes the tracing subscriber from config and environment.
fn init_logging(config: &Config) {
    use tracing_subscriber::EnvFilter;

    let default_level = if config.debug {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("procmon={}", default_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;
    init_logging(&config);

    if cli.check_config {
        println!("configuration OK");
        return Ok(());
    }

    run(config).await
}

/// Builds the agent and drives the sampling loop until Ctrl-C.
async fn run(config: Config) -> Result<()> {
    let agent = Agent::from_config(&config)?;
    tracing::info!(
        sinks = %config.sinks.spec,
        interval = ?config.sampling.interval,
        buffered = config.buffering.enabled,
        "agent started"
    );

    let mut ticker = tokio::time::interval(config.sampling.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick fires immediately; skip it so the sampler baseline
    // has a full interval behind it
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let emitted = agent.sample();
                tracing::debug!(metrics = emitted, "sampling round complete");
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    agent.flush();
    let stats = agent.stats();
    tracing::info!(
        metrics = stats.metrics_sent,
        flushes = stats.flushes,
        sink_failures = stats.sink_failures,
        "agent stopped"
    );
    Ok(())
}
