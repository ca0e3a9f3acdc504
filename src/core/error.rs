//! Error types shared across the crate.

use thiserror::Error;

/// All failure modes surfaced by the agent, sampler, dispatcher and sinks.
#[derive(Error, Debug)]
pub enum ProcmonError {
    /// Sampling was invoked before the minimum interval elapsed.
    #[error("sampling invoked too frequently: only {elapsed_us}us elapsed, minimum is {min_us}us")]
    TooFrequent {
        /// Microseconds since the last successful sample
        elapsed_us: u64,
        /// Minimum allowed interval in microseconds
        min_us: u64,
    },

    /// An OS counter or file the sampler depends on is missing or malformed.
    #[error("OS resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Rejected configuration; fatal to setup.
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    /// One sink failed to deliver; other sinks are unaffected.
    #[error("Sink '{sink}' failed to deliver: {message}")]
    SinkDelivery {
        /// Name of the failing sink
        sink: String,
        /// Transport-level failure description
        message: String,
    },

    /// Underlying I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for procmon operations
pub type Result<T> = std::result::Result<T, ProcmonError>;

impl ProcmonError {
    /// Creates a new resource-unavailable error
    pub fn resource<S: Into<String>>(msg: S) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates a new sink delivery error
    pub fn sink<S: Into<String>, M: Into<String>>(sink: S, message: M) -> Self {
        Self::SinkDelivery {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Returns true if the caller can retry or skip past this error.
    ///
    /// Configuration errors are fatal to setup; everything else is
    /// recoverable by waiting, skipping the affected sample, or ignoring
    /// the failing sink.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidConfiguration(_))
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::TooFrequent { .. } => "sampling",
            Self::ResourceUnavailable(_) => "resource",
            Self::InvalidConfiguration(_) => "config",
            Self::SinkDelivery { .. } => "sink",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
