//! Narrow seam over OS-specific resource counters.
//!
//! The sampler's rate derivation is the part worth testing; keeping the
//! `/proc` and `getrusage` plumbing behind [`ResourceSource`] lets tests
//! drive it with synthetic snapshots.

use crate::core::Result;

/// Cumulative per-process resource counters at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSnapshot {
    /// User-mode CPU time consumed so far, in microseconds
    pub cpu_user_micros: u64,
    /// Kernel-mode CPU time consumed so far, in microseconds
    pub cpu_system_micros: u64,
    /// Involuntary context switches so far
    pub involuntary_ctx_switches: u64,
}

/// Cumulative byte counters for one network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    /// Interface name as reported by the OS
    pub name: String,
    /// Total bytes received
    pub bytes_received: u64,
    /// Total bytes transmitted
    pub bytes_transmitted: u64,
}

/// Read-only access to the OS counters the sampler derives metrics from.
///
/// Every method may fail with `ResourceUnavailable` when the backing
/// counter is absent or malformed; implementations must not panic on
/// unexpected input.
pub trait ResourceSource: Send {
    /// Total system memory in kB. Read once at sampler construction.
    fn total_memory_kb(&self) -> Result<u64>;

    /// Current cumulative CPU and context-switch counters.
    fn usage_snapshot(&self) -> Result<UsageSnapshot>;

    /// Current resident set size in kB.
    fn resident_memory_kb(&self) -> Result<u64>;

    /// Cumulative byte counters for every interface in the process's
    /// network namespace, unfiltered.
    fn network_counters(&self) -> Result<Vec<InterfaceCounters>>;
}
