//! InfluxDB UDP sink.
//!
//! Fire-and-forget line protocol over UDP, one datagram per metric.
//! Delivery is best-effort by design: UDP gives no acknowledgement, so
//! "failure" here means the local send call itself failed.

use std::net::UdpSocket;

use crate::core::{Metric, MetricValue, ProcmonError, Result};
use crate::sink::Sink;

/// Sink emitting InfluxDB line protocol datagrams.
pub struct InfluxUdpSink {
    socket: UdpSocket,
}

impl InfluxUdpSink {
    /// Binds an ephemeral local socket and connects it to `host:port`.
    ///
    /// Resolution or bind failure is a setup-time configuration error.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| ProcmonError::config(format!("cannot bind UDP socket: {}", e)))?;
        socket.connect(endpoint).map_err(|e| {
            ProcmonError::config(format!("cannot resolve influxdb-udp endpoint '{}': {}", endpoint, e))
        })?;
        tracing::debug!(endpoint, "influxdb-udp sink initialized");
        Ok(InfluxUdpSink { socket })
    }
}

impl Sink for InfluxUdpSink {
    fn name(&self) -> &str {
        "influxdb-udp"
    }

    fn send(&self, metric: &Metric) -> Result<()> {
        let line = encode_line(metric);
        self.socket
            .send(line.as_bytes())
            .map(|_| ())
            .map_err(|e| ProcmonError::sink(self.name(), e.to_string()))
    }
}

/// Renders one metric as an InfluxDB line:
/// `name[,tag=value...] value=<v> <ns-timestamp>`.
fn encode_line(metric: &Metric) -> String {
    let mut line = String::with_capacity(64);
    line.push_str(metric.name());
    for (key, value) in metric.tags() {
        line.push(',');
        line.push_str(key);
        line.push('=');
        line.push_str(value);
    }
    line.push_str(" value=");
    match metric.value() {
        MetricValue::Signed(i) => {
            line.push_str(&i.to_string());
            line.push('i');
        }
        MetricValue::Unsigned(u) => {
            line.push_str(&u.to_string());
            line.push('i');
        }
        MetricValue::Double(d) => line.push_str(&d.to_string()),
        MetricValue::Text(s) => {
            line.push('"');
            line.push_str(s);
            line.push('"');
        }
    }
    // line protocol wants nanoseconds
    line.push(' ');
    line.push_str(&(metric.timestamp_ms() as u128 * 1_000_000).to_string());
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_integer_line() {
        let metric = Metric::new(7u64, "bytesReceived").with_tag("if", "eth0");
        let line = encode_line(&metric);
        assert!(line.starts_with("bytesReceived,if=eth0 value=7i "), "line: {}", line);
    }

    #[test]
    fn test_encode_double_and_text_lines() {
        assert!(encode_line(&Metric::new(12.35f64, "cpuUsedPercentage"))
            .starts_with("cpuUsedPercentage value=12.35 "));
        assert!(encode_line(&Metric::new("up", "state")).starts_with("state value=\"up\" "));
    }

    #[test]
    fn test_timestamp_is_nanoseconds() {
        let metric = Metric::new(1i64, "m");
        let line = encode_line(&metric);
        let ts: u128 = line.rsplit(' ').next().unwrap().parse().unwrap();
        assert_eq!(ts, metric.timestamp_ms() as u128 * 1_000_000);
    }

    #[test]
    fn test_send_to_local_receiver() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = receiver.local_addr().unwrap();

        let sink = InfluxUdpSink::connect(&addr.to_string()).unwrap();
        sink.send(&Metric::new(5i64, "m")).unwrap();

        let mut buf = [0u8; 256];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        let datagram = std::str::from_utf8(&buf[..len]).unwrap();
        assert!(datagram.starts_with("m value=5i "));
    }
}
