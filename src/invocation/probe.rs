//! Resource probes sampled immediately before and after each intercepted call.
//!
//! Deltas are advisory: background allocation and page reclamation make them noisy.

use std::fs;

pub trait ResourceProbe: std::fmt::Debug {
    /// Current usage in bytes, or an implementation-defined unit.
    fn sample(&self) -> i64;
}

/// Always reports zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProbe;

impl ResourceProbe for NoopProbe {
    fn sample(&self) -> i64 {
        0
    }
}

/// Resident set size in bytes, from the `VmRSS` line of `/proc/self/status`.
/// Reports zero where procfs is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResidentMemoryProbe;

impl ResourceProbe for ResidentMemoryProbe {
    fn sample(&self) -> i64 {
        match fs::read_to_string("/proc/self/status") {
            Ok(status) => parse_vm_rss(&status).unwrap_or(0),
            Err(err) => {
                tracing::trace!("resident memory unavailable: {}", err);
                0
            }
        }
    }
}

/// Deterministic probe for tests: each sample is `step` more than the last.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct SteppingProbe {
    step: i64,
    current: std::cell::Cell<i64>,
}

#[cfg(any(test, feature = "test-utils"))]
impl SteppingProbe {
    pub fn new(step: i64) -> Self {
        SteppingProbe {
            step,
            current: std::cell::Cell::new(0),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl ResourceProbe for SteppingProbe {
    fn sample(&self) -> i64 {
        let next = self.current.get() + self.step;
        self.current.set(next);
        next
    }
}

/// `VmRSS:   1234 kB` in bytes. The kernel always reports this line in kB.
fn parse_vm_rss(status: &str) -> Option<i64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kib: i64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kib.saturating_mul(1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vm_rss() {
        let status = "Name:\tfuzz\nVmPeak:\t  9000 kB\nVmRSS:\t    256 kB\nThreads:\t1\n";
        assert_eq!(parse_vm_rss(status), Some(256 * 1024));
        assert_eq!(parse_vm_rss("Name:\tfuzz\n"), None);
        assert_eq!(parse_vm_rss("VmRSS:\tlots kB\n"), None);
    }

    #[test]
    fn test_samples_are_non_negative() {
        assert_eq!(NoopProbe.sample(), 0);
        assert!(ResidentMemoryProbe::default().sample() >= 0);
    }

    #[test]
    fn test_stepping_probe() {
        let probe = SteppingProbe::new(10);
        assert_eq!(probe.sample(), 10);
        assert_eq!(probe.sample(), 20);
    }
}
