//! Locked accumulators for request metrics and creation counters.
//!
//! Two separate lock domains: one guards latency and error statistics as a
//! unit, the other guards the monotonic creation counters. The harness runs a
//! single driver today, but the locking discipline assumes parallel drivers
//! so the design survives that extension. Composite snapshots hold both locks
//! simultaneously, always metrics before counters, so a report is never torn
//! across the two domains.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Point-in-time view of the latency and error statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Number of latency samples recorded.
    pub total_requests: u64,
    /// Mean latency across all samples; zero when no sample exists.
    pub average_latency: Duration,
    /// Largest single latency sample.
    pub peak_latency: Duration,
    /// Total number of recorded errors.
    pub total_errors: u64,
    /// Error count per HTTP status code, in ascending code order.
    pub error_counts: BTreeMap<u16, u64>,
}

/// Point-in-time view of the creation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Groups created since process start.
    pub total_groups_created: u64,
    /// Users created since process start.
    pub total_users_created: u64,
}

/// Metrics and counters captured under both locks at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSnapshot {
    /// Latency and error statistics.
    pub metrics: MetricsSnapshot,
    /// Creation counters.
    pub counters: CounterSnapshot,
}

#[derive(Debug, Default)]
struct MetricsState {
    total_requests: u64,
    total_latency: Duration,
    peak_latency: Duration,
    error_counts: BTreeMap<u16, u64>,
    total_errors: u64,
}

impl MetricsState {
    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests,
            average_latency: average(self.total_latency, self.total_requests),
            peak_latency: self.peak_latency,
            total_errors: self.total_errors,
            error_counts: self.error_counts.clone(),
        }
    }
}

fn average(total: Duration, samples: u64) -> Duration {
    if samples == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / u128::from(samples);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Thread-safe accumulator of request latency and error statistics.
///
/// Every remote call records a latency sample, including failed calls: the
/// round trip is measured before the outcome is known, which mirrors how the
/// statistics behave in operation rather than only on the happy path.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    state: Mutex<MetricsState>,
}

impl MetricsAggregator {
    /// Build an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one latency sample.
    pub fn record_latency(&self, sample: Duration) {
        let mut state = self.lock_state();
        state.total_requests += 1;
        state.total_latency += sample;
        if sample > state.peak_latency {
            state.peak_latency = sample;
        }
    }

    /// Record one error under `status_code`.
    pub fn record_error(&self, status_code: u16) {
        let mut state = self.lock_state();
        *state.error_counts.entry(status_code).or_insert(0) += 1;
        state.total_errors += 1;
    }

    /// Capture a consistent snapshot of all statistics.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.lock_state().snapshot()
    }

    fn lock_state(&self) -> MutexGuard<'_, MetricsState> {
        // Recording is plain arithmetic that cannot leave the state halfway
        // updated, so a poisoned lock is recovered rather than propagated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct CounterState {
    total_groups_created: u64,
    total_users_created: u64,
}

impl CounterState {
    fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            total_groups_created: self.total_groups_created,
            total_users_created: self.total_users_created,
        }
    }
}

/// Monotonic counters for created entities, process lifetime scope.
#[derive(Debug, Default)]
pub struct CreationCounters {
    state: Mutex<CounterState>,
}

impl CreationCounters {
    /// Build zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one created group.
    pub fn record_group(&self) {
        self.lock_state().total_groups_created += 1;
    }

    /// Count one created user.
    pub fn record_user(&self) {
        self.lock_state().total_users_created += 1;
    }

    /// Capture the current counter values.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        self.lock_state().snapshot()
    }

    fn lock_state(&self) -> MutexGuard<'_, CounterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Capture both statistic domains under their locks at once.
///
/// Lock order is fixed (metrics, then counters) so a parallel-driver
/// extension cannot deadlock against reporting.
#[must_use]
pub fn composite_snapshot(
    metrics: &MetricsAggregator,
    counters: &CreationCounters,
) -> CompositeSnapshot {
    let metrics_state = metrics.lock_state();
    let counter_state = counters.lock_state();
    CompositeSnapshot {
        metrics: metrics_state.snapshot(),
        counters: counter_state.snapshot(),
    }
}
