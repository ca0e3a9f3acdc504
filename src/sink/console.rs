//! Console sink.
//!
//! Renders one line per metric in the legacy monitoring text shape:
//!
//! ```text
//! 2026-08-30 12:00:00	[METRIC] process/cpuUsedPercentage,2 12.35 1787572800000 env=test,if=eth0
//! ```
//!
//! Fields: local timestamp, optionally-namespaced metric name, wire type
//! id, value, millisecond Unix timestamp, comma-joined tags (global tags
//! first — the agent prepends them before metrics reach any sink).

use std::io::Write;

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use crate::core::{Metric, ProcmonError, Result};
use crate::sink::Sink;

/// Sink writing the legacy text shape to stdout or an injected writer.
pub struct ConsoleSink {
    measurement: Option<String>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Console sink writing to stdout.
    pub fn stdout(measurement: Option<&str>) -> Self {
        Self::with_writer(measurement, Box::new(std::io::stdout()))
    }

    /// Console sink writing to an arbitrary target; used by tests to
    /// capture output.
    pub fn with_writer(measurement: Option<&str>, writer: Box<dyn Write + Send>) -> Self {
        tracing::debug!("console sink initialized");
        ConsoleSink {
            measurement: measurement.map(str::to_owned),
            writer: Mutex::new(writer),
        }
    }

    fn render(&self, metric: &Metric) -> String {
        let local: DateTime<Local> = metric.timestamp().into();
        let tags = metric.format_tags();
        let mut line = format!(
            "{}\t[METRIC] ",
            local.format("%Y-%m-%d %H:%M:%S"),
        );
        if let Some(measurement) = &self.measurement {
            line.push_str(measurement);
            line.push('/');
        }
        line.push_str(&format!(
            "{},{} {} {}",
            metric.name(),
            metric.value().type_id(),
            metric.value(),
            metric.timestamp_ms(),
        ));
        if !tags.is_empty() {
            line.push(' ');
            line.push_str(&tags);
        }
        line.push('\n');
        line
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, metric: &Metric) -> Result<()> {
        let line = self.render(metric);
        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .map_err(|e| ProcmonError::sink(self.name(), e.to_string()))
    }

    fn send_batch(&self, metrics: &[Metric]) -> Result<()> {
        // One write call per flush so a batch lands as one console unit.
        let mut out = String::new();
        for metric in metrics {
            out.push_str(&self.render(metric));
        }
        let mut writer = self.writer.lock();
        writer
            .write_all(out.as_bytes())
            .map_err(|e| ProcmonError::sink(self.name(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Writer handing written bytes back to the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_line_shape() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::with_writer(None, Box::new(buf.clone()));

        let metric = Metric::new(42i64, "myMetric").with_tag("if", "eth0");
        sink.send(&metric).unwrap();

        let line = buf.contents();
        assert!(line.contains("[METRIC] myMetric,0 42 "), "line: {}", line);
        assert!(line.ends_with("if=eth0\n"), "line: {}", line);
        assert!(line.contains(&metric.timestamp_ms().to_string()));
    }

    #[test]
    fn test_measurement_prefix() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::with_writer(Some("process"), Box::new(buf.clone()));

        sink.send(&Metric::new(1.5f64, "cpuUsedPercentage")).unwrap();
        assert!(buf.contents().contains("[METRIC] process/cpuUsedPercentage,2 1.5 "));
    }

    #[test]
    fn test_batch_preserves_order() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::with_writer(None, Box::new(buf.clone()));

        let batch = vec![
            Metric::new(1i64, "first"),
            Metric::new(2i64, "second"),
            Metric::new(3i64, "third"),
        ];
        sink.send_batch(&batch).unwrap();

        let out = buf.contents();
        let first = out.find("first").unwrap();
        let second = out.find("second").unwrap();
        let third = out.find("third").unwrap();
        assert!(first < second && second < third);
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn test_no_trailing_space_without_tags() {
        let buf = SharedBuf::default();
        let sink = ConsoleSink::with_writer(None, Box::new(buf.clone()));

        sink.send(&Metric::new("hello", "textMetric")).unwrap();
        let line = buf.contents();
        assert!(line.contains("textMetric,1 hello "));
        assert!(!line.trim_end_matches('\n').ends_with(' '));
    }
}
