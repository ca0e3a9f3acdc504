//! Linux implementation of [`ResourceSource`].
//!
//! CPU time and context switches come from `getrusage(RUSAGE_SELF)`;
//! memory and network counters come from `/proc`. All reads are
//! best-effort: a missing or reformatted file surfaces as
//! `ResourceUnavailable`, never a panic.

use std::fs;

use crate::core::{ProcmonError, Result};
use crate::sampler::source::{InterfaceCounters, ResourceSource, UsageSnapshot};

/// Resource source backed by `/proc` and `getrusage` for the current process.
#[derive(Debug)]
pub struct ProcSource {
    pid: u32,
}

impl ProcSource {
    /// Creates a source bound to the current process id.
    pub fn new() -> Self {
        ProcSource {
            pid: std::process::id(),
        }
    }
}

impl Default for ProcSource {
    fn default() -> Self {
        Self::new()
    }
}

fn timeval_micros(tv: &libc::timeval) -> u64 {
    tv.tv_sec as u64 * 1_000_000 + tv.tv_usec as u64
}

impl ResourceSource for ProcSource {
    fn total_memory_kb(&self) -> Result<u64> {
        let meminfo = fs::read_to_string("/proc/meminfo")
            .map_err(|e| ProcmonError::resource(format!("cannot read /proc/meminfo: {}", e)))?;
        // First line: "MemTotal:       16384000 kB"
        let first = meminfo
            .lines()
            .next()
            .ok_or_else(|| ProcmonError::resource("/proc/meminfo is empty"))?;
        parse_kb_line(first, "MemTotal")
    }

    fn usage_snapshot(&self) -> Result<UsageSnapshot> {
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) };
        if rc != 0 {
            return Err(ProcmonError::resource(format!(
                "getrusage failed: {}",
                std::io::Error::last_os_error()
            )));
        }
        Ok(UsageSnapshot {
            cpu_user_micros: timeval_micros(&usage.ru_utime),
            cpu_system_micros: timeval_micros(&usage.ru_stime),
            involuntary_ctx_switches: usage.ru_nivcsw as u64,
        })
    }

    fn resident_memory_kb(&self) -> Result<u64> {
        let status = fs::read_to_string("/proc/self/status")
            .map_err(|e| ProcmonError::resource(format!("cannot read /proc/self/status: {}", e)))?;
        let line = status
            .lines()
            .find(|l| l.starts_with("VmRSS:"))
            .ok_or_else(|| ProcmonError::resource("VmRSS not present in /proc/self/status"))?;
        parse_kb_line(line, "VmRSS")
    }

    fn network_counters(&self) -> Result<Vec<InterfaceCounters>> {
        let path = format!("/proc/{}/net/dev", self.pid);
        let dev = fs::read_to_string(&path)
            .map_err(|e| ProcmonError::resource(format!("cannot read {}: {}", path, e)))?;
        parse_net_dev(&dev)
    }
}

/// Parses `/proc/<pid>/net/dev`: two header lines, then one line per
/// interface:
///
/// ```text
///   eth0: 12345 84 0 0 0 0 0 0 6789 52 0 0 0 0 0 0
/// ```
///
/// A large rx counter can sit flush against the colon, so the name is
/// split off on ':' before splitting the counter fields.
fn parse_net_dev(dev: &str) -> Result<Vec<InterfaceCounters>> {
    let mut counters = Vec::new();
    for line in dev.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim().to_string();
        let mut fields = rest.split_whitespace();
        let rx = fields
            .next()
            .and_then(|f| f.parse::<u64>().ok())
            .ok_or_else(|| ProcmonError::resource(format!("malformed rx counter for {}", name)))?;
        let tx = fields
            .nth(7)
            .and_then(|f| f.parse::<u64>().ok())
            .ok_or_else(|| ProcmonError::resource(format!("malformed tx counter for {}", name)))?;
        counters.push(InterfaceCounters {
            name,
            bytes_received: rx,
            bytes_transmitted: tx,
        });
    }
    Ok(counters)
}

/// Parses a `/proc` line of the form `Label:   <value> kB`.
fn parse_kb_line(line: &str, label: &str) -> Result<u64> {
    line.split_whitespace()
        .nth(1)
        .and_then(|v| v.parse::<u64>().ok())
        .ok_or_else(|| ProcmonError::resource(format!("cannot parse {} value from '{}'", label, line)))
}
