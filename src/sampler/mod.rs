//! Sampling-and-derivation engine.
//!
//! OS counters are cumulative and monotonic; the value of this module is
//! turning them into point-in-time rates across an irregular sampling
//! interval, and refusing to report a rate when the interval is too small
//! to be meaningful.

pub mod proc_linux;
pub mod source;

pub use proc_linux::ProcSource;
pub use source::{InterfaceCounters, ResourceSource, UsageSnapshot};

use std::time::Instant;

use crate::core::{Metric, ProcmonError, Result};

/// Minimum interval between CPU samples, in microseconds.
///
/// Below this the OS counter resolution makes the derived rate
/// meaningless; callers get a hard `TooFrequent` rejection and must
/// back off.
pub const MIN_SAMPLE_INTERVAL_US: u64 = 950;

/// Stateful engine deriving rate metrics from cumulative OS counters.
///
/// One sampler owns exactly one previous snapshot; it is not meant to be
/// shared between callers without external synchronization.
pub struct Sampler {
    source: Box<dyn ResourceSource>,
    total_memory_kb: u64,
    previous: UsageSnapshot,
    last_run: Instant,
}

impl Sampler {
    /// Initializes the sampler: reads total system memory once, takes the
    /// initial counter snapshot and starts the sampling clock.
    pub fn new(source: Box<dyn ResourceSource>) -> Result<Self> {
        let total_memory_kb = source.total_memory_kb()?;
        if total_memory_kb == 0 {
            return Err(ProcmonError::resource("total system memory reported as 0"));
        }
        let previous = source.usage_snapshot()?;
        Ok(Sampler {
            source,
            total_memory_kb,
            previous,
            last_run: Instant::now(),
        })
    }

    /// Samples CPU usage and involuntary context switches since the last
    /// successful call.
    ///
    /// Produces exactly two metrics: `cpuUsedPercentage` (two-decimal
    /// percentage) and `involuntaryContextSwitches` (unsigned delta, 0 if
    /// the OS counter appears to have decreased). On any failure,
    /// including `TooFrequent`, the stored snapshot and clock are left
    /// untouched so a later retry measures from the same baseline.
    pub fn sample_cpu_and_contexts(&mut self) -> Result<Vec<Metric>> {
        let now = Instant::now();
        let elapsed_us = now.duration_since(self.last_run).as_micros() as u64;
        if elapsed_us < MIN_SAMPLE_INTERVAL_US {
            return Err(ProcmonError::TooFrequent {
                elapsed_us,
                min_us: MIN_SAMPLE_INTERVAL_US,
            });
        }

        let current = self.source.usage_snapshot()?;
        let cpu_percent = derive_cpu_percent(
            current.cpu_user_micros.saturating_sub(self.previous.cpu_user_micros),
            current
                .cpu_system_micros
                .saturating_sub(self.previous.cpu_system_micros),
            elapsed_us,
        );
        let ctx_switches = current
            .involuntary_ctx_switches
            .saturating_sub(self.previous.involuntary_ctx_switches);

        let metrics = vec![
            Metric::new(cpu_percent, "cpuUsedPercentage"),
            Metric::new(ctx_switches, "involuntaryContextSwitches"),
        ];

        self.last_run = now;
        self.previous = current;
        Ok(metrics)
    }

    /// Samples resident memory as a percentage of total system memory.
    ///
    /// The value is not clamped: a reading above total memory (possible
    /// with shared mappings counted oddly) is passed through as > 100.
    pub fn sample_memory_usage(&mut self) -> Result<Metric> {
        let rss_kb = self.source.resident_memory_kb()?;
        let percent = rss_kb as f64 * 100.0 / self.total_memory_kb as f64;
        Ok(Metric::new(percent, "memoryUsagePercentage"))
    }

    /// Samples per-interface network byte counters.
    ///
    /// Loopback and virtual-bridge interfaces are skipped; for every
    /// remaining interface two unsigned metrics are emitted, tagged with
    /// the interface name under `if`. The result may be empty.
    pub fn sample_network_usage(&mut self) -> Result<Vec<Metric>> {
        let counters = self.source.network_counters()?;
        let mut metrics = Vec::with_capacity(counters.len() * 2);
        for iface in counters {
            if skip_interface(&iface.name) {
                continue;
            }
            metrics.push(
                Metric::new(iface.bytes_received, "bytesReceived").with_tag("if", &iface.name),
            );
            metrics.push(
                Metric::new(iface.bytes_transmitted, "bytesTransmitted")
                    .with_tag("if", &iface.name),
            );
        }
        Ok(metrics)
    }

    #[cfg(test)]
    fn backdate_last_run(&mut self, by: std::time::Duration) {
        self.last_run -= by;
    }
}

/// CPU fraction over the interval, as a percentage rounded to two decimals.
fn derive_cpu_percent(delta_user_us: u64, delta_system_us: u64, elapsed_us: u64) -> f64 {
    let fraction = (delta_user_us + delta_system_us) as f64 / elapsed_us as f64;
    (fraction * 100.0 * 100.0).round() / 100.0
}

/// True for interfaces that should never be reported: loopback and
/// virtual bridges.
fn skip_interface(name: &str) -> bool {
    name == "lo" || name.contains("virbr")
}
