//! Agent composition root.
//!
//! Owns the global tags, one sampler and one dispatcher, and exposes the
//! public send/sample/flush surface. A single mutex covers the whole
//! send-or-flush critical section so the agent can be shared between
//! producer threads without a flush racing a concurrent append.

use parking_lot::Mutex;

use crate::core::{Config, Metric, MetricValue, Result};
use crate::dispatch::{DispatchStats, Dispatcher};
use crate::sampler::{ProcSource, Sampler};
use crate::sink::sinks_from_spec;

#[derive(Clone, Copy)]
struct SampleToggles {
    cpu: bool,
    memory: bool,
    network: bool,
}

impl Default for SampleToggles {
    fn default() -> Self {
        SampleToggles {
            cpu: true,
            memory: true,
            network: true,
        }
    }
}

struct AgentState {
    global_tags: Vec<(String, String)>,
    sampler: Sampler,
    dispatcher: Dispatcher,
    toggles: SampleToggles,
}

/// Process-telemetry agent: tag decoration, sampling, dispatch.
pub struct Agent {
    state: Mutex<AgentState>,
}

impl Agent {
    /// Builds the agent from configuration: sink construction, optional
    /// buffering and global tags. Fails fast on any configuration error,
    /// before a single metric is sampled or dispatched.
    pub fn from_config(config: &Config) -> Result<Self> {
        let sinks = sinks_from_spec(&config.sinks.spec, config.sinks.measurement.as_deref())?;
        let mut dispatcher = Dispatcher::with_sinks(sinks);
        if config.buffering.enabled {
            dispatcher.enable_buffering(config.buffering.capacity)?;
        }
        let sampler = Sampler::new(Box::new(ProcSource::new()))?;
        let agent = Self::from_parts(dispatcher, sampler);
        agent.state.lock().toggles = SampleToggles {
            cpu: config.sampling.cpu,
            memory: config.sampling.memory,
            network: config.sampling.network,
        };
        for tag in &config.tags {
            agent.add_global_tag(&tag.key, &tag.value);
        }
        Ok(agent)
    }

    /// Assembles an agent from pre-built parts. Used by tests to inject
    /// synthetic samplers and recording sinks.
    pub fn from_parts(dispatcher: Dispatcher, sampler: Sampler) -> Self {
        Agent {
            state: Mutex::new(AgentState {
                global_tags: Vec::new(),
                sampler,
                dispatcher,
                toggles: SampleToggles::default(),
            }),
        }
    }

    /// Appends a global tag. Key collisions keep both entries on the
    /// wire; there is no last-write-wins deduplication.
    pub fn add_global_tag<K: Into<String>, V: Into<String>>(&self, key: K, value: V) {
        self.state.lock().global_tags.push((key.into(), value.into()));
    }

    /// Routes one metric through tag decoration and the dispatcher.
    ///
    /// Global tags are prepended at this boundary; metrics already
    /// dispatched are never retouched by later `add_global_tag` calls.
    pub fn send(&self, metric: Metric) {
        let mut state = self.state.lock();
        let metric = if state.global_tags.is_empty() {
            metric
        } else {
            metric.with_prefix_tags(&state.global_tags)
        };
        state.dispatcher.send(metric);
    }

    /// Constructs a metric from a raw value and name, timestamped now,
    /// and routes it.
    pub fn send_value<V: Into<MetricValue>, S: Into<String>>(&self, value: V, name: S) {
        self.send(Metric::new(value, name));
    }

    /// Switches the dispatcher to batch mode. One-way; capacity must be
    /// at least 1.
    pub fn enable_buffering(&self, capacity: usize) -> Result<()> {
        self.state.lock().dispatcher.enable_buffering(capacity)
    }

    /// Flushes any buffered metrics to every sink.
    pub fn flush(&self) {
        self.state.lock().dispatcher.flush_buffer();
    }

    /// Runs one sampling round (CPU/context switches, memory, network)
    /// and routes every produced metric.
    ///
    /// Recoverable sampling failures are logged and skip only the
    /// affected metrics; the round never fails as a whole. Returns the
    /// number of metrics emitted. The agent runs no timer of its own —
    /// invoke this on an interval of at least the sampler minimum.
    pub fn sample(&self) -> usize {
        let mut state = self.state.lock();
        let toggles = state.toggles;
        let mut produced = Vec::new();

        if toggles.cpu {
            match state.sampler.sample_cpu_and_contexts() {
                Ok(metrics) => produced.extend(metrics),
                Err(e) => tracing::warn!(category = e.category(), error = %e, "cpu sample skipped"),
            }
        }
        if toggles.memory {
            match state.sampler.sample_memory_usage() {
                Ok(metric) => produced.push(metric),
                Err(e) => {
                    tracing::warn!(category = e.category(), error = %e, "memory sample skipped")
                }
            }
        }
        if toggles.network {
            match state.sampler.sample_network_usage() {
                Ok(metrics) => produced.extend(metrics),
                Err(e) => {
                    tracing::warn!(category = e.category(), error = %e, "network sample skipped")
                }
            }
        }

        let count = produced.len();
        for metric in produced {
            let metric = if state.global_tags.is_empty() {
                metric
            } else {
                metric.with_prefix_tags(&state.global_tags)
            };
            state.dispatcher.send(metric);
        }
        count
    }

    /// Dispatcher delivery counters.
    pub fn stats(&self) -> DispatchStats {
        self.state.lock().dispatcher.stats()
    }
}
