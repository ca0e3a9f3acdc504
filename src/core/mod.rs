//! Core domain types for procmon.
//!
//! This module contains the metric value object, error types and
//! configuration handling shared by the sampler, dispatcher and sinks.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metric;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, GlobalTag};
pub use error::{ProcmonError, Result};
pub use metric::{Metric, MetricValue, TagList};
