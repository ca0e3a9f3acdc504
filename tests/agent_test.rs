//! End-to-end agent tests over the public API: synthetic resource
//! source, recording sinks, buffered dispatch.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use procmon::core::{Metric, ProcmonError, Result};
use procmon::dispatch::Dispatcher;
use procmon::sampler::{InterfaceCounters, ResourceSource, Sampler, UsageSnapshot};
use procmon::sink::{ConsoleSink, Sink};
use procmon::Agent;

struct StaticSource;

impl ResourceSource for StaticSource {
    fn total_memory_kb(&self) -> Result<u64> {
        Ok(8_000_000)
    }

    fn usage_snapshot(&self) -> Result<UsageSnapshot> {
        Ok(UsageSnapshot {
            cpu_user_micros: 0,
            cpu_system_micros: 0,
            involuntary_ctx_switches: 0,
        })
    }

    fn resident_memory_kb(&self) -> Result<u64> {
        Ok(2_000_000)
    }

    fn network_counters(&self) -> Result<Vec<InterfaceCounters>> {
        Ok(vec![
            InterfaceCounters {
                name: "lo".into(),
                bytes_received: 1,
                bytes_transmitted: 1,
            },
            InterfaceCounters {
                name: "eth0".into(),
                bytes_received: 4096,
                bytes_transmitted: 1024,
            },
        ])
    }
}

#[derive(Clone)]
struct RecordingSink {
    label: &'static str,
    fail: bool,
    delivered: Arc<Mutex<Vec<Metric>>>,
    batch_sizes: Arc<Mutex<Vec<usize>>>,
}

impl RecordingSink {
    fn new(label: &'static str) -> Self {
        RecordingSink {
            label,
            fail: false,
            delivered: Arc::new(Mutex::new(Vec::new())),
            batch_sizes: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Sink for RecordingSink {
    fn name(&self) -> &str {
        self.label
    }

    fn send(&self, metric: &Metric) -> Result<()> {
        if self.fail {
            return Err(ProcmonError::sink(self.label, "synthetic failure"));
        }
        self.delivered.lock().push(metric.clone());
        Ok(())
    }

    fn send_batch(&self, metrics: &[Metric]) -> Result<()> {
        if self.fail {
            return Err(ProcmonError::sink(self.label, "synthetic failure"));
        }
        self.batch_sizes.lock().push(metrics.len());
        self.delivered.lock().extend(metrics.iter().cloned());
        Ok(())
    }
}

fn agent_over(sinks: Vec<Box<dyn Sink>>) -> Agent {
    let dispatcher = Dispatcher::with_sinks(sinks);
    let sampler = Sampler::new(Box::new(StaticSource)).unwrap();
    Agent::from_parts(dispatcher, sampler)
}

#[test]
fn test_buffering_scenario_25_sends_capacity_10() {
    let a = RecordingSink::new("a");
    let b = RecordingSink::new("b");
    let (a_sizes, b_sizes) = (a.batch_sizes.clone(), b.batch_sizes.clone());
    let a_delivered = a.delivered.clone();

    let agent = agent_over(vec![Box::new(a), Box::new(b)]);
    agent.enable_buffering(10).unwrap();
    for i in 0..25i64 {
        agent.send_value(i, "myMetricInt");
    }
    agent.flush();

    // exactly three flush events, batch sizes 10, 10, 5, at every sink
    assert_eq!(*a_sizes.lock(), vec![10, 10, 5]);
    assert_eq!(*b_sizes.lock(), vec![10, 10, 5]);

    // insertion order survives batching
    let values: Vec<String> = a_delivered
        .lock()
        .iter()
        .map(|m| m.value().to_string())
        .collect();
    let expected: Vec<String> = (0..25).map(|i| i.to_string()).collect();
    assert_eq!(values, expected);
}

#[test]
fn test_one_failing_sink_leaves_others_delivering() {
    let mut bad = RecordingSink::new("bad");
    bad.fail = true;
    let good = RecordingSink::new("good");
    let good_delivered = good.delivered.clone();

    let agent = agent_over(vec![Box::new(bad), Box::new(good)]);
    agent.enable_buffering(5).unwrap();
    for i in 0..5i64 {
        agent.send_value(i, "m");
    }

    assert_eq!(good_delivered.lock().len(), 5);
    assert_eq!(agent.stats().sink_failures, 1);
    assert_eq!(agent.stats().flushes, 1);
}

#[test]
fn test_console_round_trip_with_global_and_metric_tags() {
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let buf = SharedBuf::default();
    let console = ConsoleSink::with_writer(None, Box::new(buf.clone()));

    let agent = agent_over(vec![Box::new(console)]);
    agent.add_global_tag("env", "test");
    agent.send(Metric::new(512u64, "bytesReceived").with_tag("if", "eth0"));

    let out = String::from_utf8(buf.0.lock().clone()).unwrap();
    // global tags precede per-metric tags, comma-joined
    assert!(out.contains("env=test,if=eth0"), "line: {}", out);
    assert!(out.contains("bytesReceived,3 512 "), "line: {}", out);
}

#[test]
fn test_sampling_round_through_buffered_dispatch() {
    let sink = RecordingSink::new("rec");
    let delivered = sink.delivered.clone();

    let agent = agent_over(vec![Box::new(sink)]);
    agent.add_global_tag("service", "itest");
    agent.enable_buffering(100).unwrap();

    std::thread::sleep(Duration::from_millis(2));
    let emitted = agent.sample();
    assert_eq!(emitted, 5); // cpu%, ctx, mem%, eth0 rx/tx
    assert!(delivered.lock().is_empty(), "still buffered");

    agent.flush();
    let delivered = delivered.lock();
    assert_eq!(delivered.len(), 5);

    let names: Vec<&str> = delivered.iter().map(|m| m.name()).collect();
    assert!(names.contains(&"memoryUsagePercentage"));
    assert!(!delivered
        .iter()
        .any(|m| m.tags().iter().any(|(k, v)| k == "if" && v == "lo")));
    for metric in delivered.iter() {
        assert!(metric.format_tags().starts_with("service=itest"));
    }
}
