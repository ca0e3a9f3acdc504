//! Buffered multi-sink dispatch.
//!
//! Decouples metric production rate from sink transmission rate and fans
//! identical batches out to every registered sink. One sink's failure
//! never affects another's delivery, and a flushed batch is gone whether
//! or not every sink accepted it (at-most-once, no redelivery).

use crate::core::Metric;
use crate::core::{ProcmonError, Result};
use crate::sink::Sink;

/// Delivery counters, exposed for logging and shutdown summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Metrics accepted by `send`
    pub metrics_sent: u64,
    /// Non-empty flushes performed
    pub flushes: u64,
    /// Individual sink delivery failures (isolated, never propagated)
    pub sink_failures: u64,
}

enum Mode {
    Immediate,
    Buffered { capacity: usize },
}

/// Fan-out stage between producers and sinks.
///
/// Starts in immediate-forward mode; [`Dispatcher::enable_buffering`]
/// switches to batch mode for the rest of the dispatcher's lifetime.
/// Not internally synchronized: concurrent producers must wrap it in a
/// lock covering the whole send/flush critical section (the agent does).
pub struct Dispatcher {
    sinks: Vec<Box<dyn Sink>>,
    mode: Mode,
    batch: Vec<Metric>,
    stats: DispatchStats,
}

impl Dispatcher {
    /// Creates an empty dispatcher in immediate mode.
    pub fn new() -> Self {
        Dispatcher {
            sinks: Vec::new(),
            mode: Mode::Immediate,
            batch: Vec::new(),
            stats: DispatchStats::default(),
        }
    }

    /// Creates a dispatcher over the given sinks, in registration order.
    pub fn with_sinks(sinks: Vec<Box<dyn Sink>>) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.sinks = sinks;
        dispatcher
    }

    /// Registers one more sink.
    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Switches to batch mode with the given capacity (metric count).
    ///
    /// Capacity must be at least 1. Re-invoking while already buffered
    /// adjusts the capacity, flushing first when the held batch already
    /// meets the new one. There is no way back to immediate mode.
    pub fn enable_buffering(&mut self, capacity: usize) -> Result<()> {
        if capacity == 0 {
            return Err(ProcmonError::config("buffering capacity must be at least 1"));
        }
        if self.batch.len() >= capacity {
            self.flush_buffer();
        }
        self.batch.reserve(capacity);
        self.mode = Mode::Buffered { capacity };
        Ok(())
    }

    /// Accepts one metric: forwards immediately or appends to the batch,
    /// auto-flushing when the batch reaches capacity.
    pub fn send(&mut self, metric: Metric) {
        self.stats.metrics_sent += 1;
        match self.mode {
            Mode::Immediate => {
                for sink in &self.sinks {
                    if let Err(e) = sink.send(&metric) {
                        self.stats.sink_failures += 1;
                        tracing::warn!(sink = sink.name(), error = %e, "metric delivery failed");
                    }
                }
            }
            Mode::Buffered { capacity } => {
                self.batch.push(metric);
                if self.batch.len() >= capacity {
                    self.flush_buffer();
                }
            }
        }
    }

    /// Forwards the held batch to every sink, then clears it regardless
    /// of per-sink outcomes. No-op on an empty batch (and therefore in
    /// immediate mode).
    pub fn flush_buffer(&mut self) {
        if self.batch.is_empty() {
            return;
        }
        for sink in &self.sinks {
            if let Err(e) = sink.send_batch(&self.batch) {
                self.stats.sink_failures += 1;
                tracing::warn!(
                    sink = sink.name(),
                    batch_len = self.batch.len(),
                    error = %e,
                    "batch delivery failed"
                );
            }
        }
        self.batch.clear();
        self.stats.flushes += 1;
    }

    /// Number of metrics currently buffered.
    pub fn buffered(&self) -> usize {
        self.batch.len()
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Delivery counters so far.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
