//! Discard sink: accepts everything, delivers nowhere. Useful for load
//! testing the dispatch path without I/O.

use crate::core::{Metric, Result};
use crate::sink::Sink;

/// Sink that drops every metric.
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    /// Creates a discard sink.
    pub fn new() -> Self {
        NullSink
    }
}

impl Sink for NullSink {
    fn name(&self) -> &str {
        "discard"
    }

    fn send(&self, _metric: &Metric) -> Result<()> {
        Ok(())
    }

    fn send_batch(&self, _metrics: &[Metric]) -> Result<()> {
        Ok(())
    }
}
