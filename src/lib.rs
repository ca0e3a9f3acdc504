//! procmon - lightweight process-telemetry agent.
//!
//! procmon samples OS resource counters for the current process (CPU
//! time, memory residency, context switches, network byte counters) at a
//! bounded rate, derives point-in-time rate metrics from the raw
//! cumulative counters, and fans them out to one or more pluggable sinks
//! through a buffering layer that decouples sampling cadence from
//! transmission cadence.
//!
//! # Architecture
//!
//! - `core`: metric value object, errors, configuration
//! - `sampler`: rate derivation over OS counters, behind a narrow
//!   resource-source seam
//! - `sink`: pluggable backends (console, InfluxDB UDP) and the URI
//!   factory
//! - `dispatch`: buffered multi-sink fan-out with per-sink failure
//!   isolation
//! - `agent`: composition root owning global tags, sampler and
//!   dispatcher
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use procmon::core::{Config, Result};
//! use procmon::Agent;
//!
//! fn main() -> Result<()> {
//!     let config = Config::default();
//!     let agent = Agent::from_config(&config)?;
//!     agent.add_global_tag("service", "demo");
//!     agent.send_value(10i64, "queueDepth");
//!     agent.sample();
//!     agent.flush();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod agent;
pub mod cli;
pub mod core;
pub mod dispatch;
pub mod sampler;
pub mod sink;

// Re-export the public surface for convenience
pub use crate::agent::Agent;
pub use crate::core::{Config, Metric, MetricValue, ProcmonError, Result};
