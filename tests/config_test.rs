//! Configuration system tests.

use std::time::Duration;

use pretty_assertions::assert_eq;
use procmon::core::{Config, ConfigBuilder};

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.sinks.spec, "stdout://");
    assert_eq!(config.sampling.interval, Duration::from_secs(1));
    assert!(!config.buffering.enabled);
    assert!(config.tags.is_empty());
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .sinks("stdout://,discard://")
        .measurement("process")
        .buffer_capacity(50)
        .sampling_interval(Duration::from_millis(500))
        .global_tag("env", "test")
        .debug(true)
        .build()
        .unwrap();

    assert_eq!(config.sinks.spec, "stdout://,discard://");
    assert_eq!(config.sinks.measurement.as_deref(), Some("process"));
    assert!(config.buffering.enabled);
    assert_eq!(config.buffering.capacity, 50);
    assert_eq!(config.sampling.interval, Duration::from_millis(500));
    assert_eq!(config.tags.len(), 1);
    assert!(config.debug);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
sinks:
  spec: "stdout://,influxdb-udp://localhost:8089"
  measurement: process
buffering:
  enabled: true
  capacity: 20
sampling:
  interval: 250ms
  cpu: true
  memory: true
  network: false
tags:
  - key: env
    value: staging
  - key: host
    value: web-1
"#;

    let config = ConfigBuilder::new()
        .from_yaml(yaml)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.sinks.spec, "stdout://,influxdb-udp://localhost:8089");
    assert_eq!(config.sinks.measurement.as_deref(), Some("process"));
    assert!(config.buffering.enabled);
    assert_eq!(config.buffering.capacity, 20);
    assert_eq!(config.sampling.interval, Duration::from_millis(250));
    assert!(!config.sampling.network);
    assert_eq!(config.tags.len(), 2);
    assert_eq!(config.tags[0].key, "env");
    assert_eq!(config.tags[1].value, "web-1");
}

#[test]
fn test_yaml_partial_config_uses_defaults() {
    let config = ConfigBuilder::new()
        .from_yaml("sampling:\n  interval: 5s\n")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.sampling.interval, Duration::from_secs(5));
    assert_eq!(config.sinks.spec, "stdout://");
}

#[test]
fn test_config_validation() {
    assert!(Config::default().validate().is_ok());

    // zero buffering capacity
    assert!(ConfigBuilder::new().buffer_capacity(0).build().is_err());

    // interval below the sampler floor
    assert!(ConfigBuilder::new()
        .sampling_interval(Duration::from_micros(100))
        .build()
        .is_err());

    // empty sink spec
    assert!(ConfigBuilder::new().sinks("").build().is_err());
}

#[test]
fn test_invalid_yaml_rejected() {
    assert!(ConfigBuilder::new().from_yaml("sinks: [not, a, map").is_err());
}
