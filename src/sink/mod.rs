//! Pluggable metric sinks.
//!
//! A sink owns its own transport and formatting; the dispatcher only ever
//! talks to the [`Sink`] trait. Sinks never add tags of their own — tag
//! decoration is the agent's job.

pub mod console;
pub mod influx_udp;
pub mod null;

pub use console::ConsoleSink;
pub use influx_udp::InfluxUdpSink;
pub use null::NullSink;

use crate::core::{Metric, ProcmonError, Result};

/// Destination capability every backend implements.
pub trait Sink: Send {
    /// Short backend name, used in logs and delivery errors.
    fn name(&self) -> &str;

    /// Delivers one metric.
    fn send(&self, metric: &Metric) -> Result<()>;

    /// Delivers an ordered batch as one logical unit.
    ///
    /// Backends without real batching inherit this default: one `send`
    /// per metric, in order.
    fn send_batch(&self, metrics: &[Metric]) -> Result<()> {
        for metric in metrics {
            self.send(metric)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for dyn Sink + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink").field("name", &self.name()).finish()
    }
}

/// Builds sinks from a comma-separated list of URI-like entries.
///
/// Supported schemes: `stdout://` (console), `influxdb-udp://host:port`,
/// `discard://`. Unknown schemes fail with `InvalidConfiguration`.
pub fn sinks_from_spec(spec: &str, measurement: Option<&str>) -> Result<Vec<Box<dyn Sink>>> {
    let mut sinks: Vec<Box<dyn Sink>> = Vec::new();
    for entry in spec.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        sinks.push(sink_from_uri(entry, measurement)?);
    }
    if sinks.is_empty() {
        return Err(ProcmonError::config(format!(
            "sink spec '{}' yielded no sinks",
            spec
        )));
    }
    Ok(sinks)
}

fn sink_from_uri(uri: &str, measurement: Option<&str>) -> Result<Box<dyn Sink>> {
    let (scheme, rest) = uri
        .split_once("://")
        .ok_or_else(|| ProcmonError::config(format!("malformed sink URI '{}'", uri)))?;

    match scheme {
        "stdout" => Ok(Box::new(ConsoleSink::stdout(measurement))),
        "influxdb-udp" => {
            if rest.is_empty() {
                return Err(ProcmonError::config(format!(
                    "sink URI '{}' is missing host:port",
                    uri
                )));
            }
            Ok(Box::new(InfluxUdpSink::connect(rest)?))
        }
        "discard" => Ok(Box::new(NullSink::new())),
        other => Err(ProcmonError::config(format!("unknown sink scheme '{}'", other))),
    }
}
