//! Dispatch metrics for observability
//!
//! The engine is single-threaded by design, so counters live in `Cell`s
//! rather than atomics.

use std::cell::Cell;

/// Counters for a single dispatcher instance.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Completed dispatch cycles
    cycle_count: Cell<u64>,
    /// Handler invocations, regardless of trigger
    invocation_count: Cell<u64>,
    /// Invocations forced early by `wait_for`
    forced_count: Cell<u64>,
}

impl DispatchMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get completed cycle count
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count.get()
    }

    /// Increment completed cycle count
    pub fn inc_cycle_count(&self) {
        self.cycle_count.set(self.cycle_count.get() + 1);
    }

    /// Get total invocation count
    pub fn invocation_count(&self) -> u64 {
        self.invocation_count.get()
    }

    /// Increment invocation count
    pub fn inc_invocation_count(&self) {
        self.invocation_count.set(self.invocation_count.get() + 1);
    }

    /// Get count of invocations forced by `wait_for`
    pub fn forced_count(&self) -> u64 {
        self.forced_count.get()
    }

    /// Increment forced invocation count
    pub fn inc_forced_count(&self) {
        self.forced_count.set(self.forced_count.get() + 1);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycle_count: self.cycle_count(),
            invocation_count: self.invocation_count(),
            forced_count: self.forced_count(),
        }
    }
}

/// Snapshot of dispatch metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub cycle_count: u64,
    pub invocation_count: u64,
    pub forced_count: u64,
}
