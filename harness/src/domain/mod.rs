//! Domain services and aggregates for the load harness.
//!
//! Purpose: keep cycle orchestration, credential lease handling, and metrics
//! accumulation transport-agnostic. Adapters implement the ports in
//! [`ports`]; nothing in this module performs I/O beyond those ports.
//!
//! Public surface:
//! - [`CredentialLease`] / [`LeaseManager`] — admin token lifecycle.
//! - [`MetricsAggregator`] / [`CreationCounters`] — locked accumulators.
//! - [`WorkloadDriver`] — one group/subgroup/user creation cycle.
//! - [`reporter`] — per-cycle report rendering.

pub mod error;
pub mod lease;
pub mod metrics;
pub mod ports;
pub mod reporter;
pub mod workload;

pub use self::error::{CycleError, FatalAuthError, FatalError};
pub use self::lease::{CredentialLease, LeaseManager};
pub use self::metrics::{
    CompositeSnapshot, CounterSnapshot, CreationCounters, MetricsAggregator, MetricsSnapshot,
    composite_snapshot,
};
pub use self::workload::{WorkloadConfig, WorkloadDriver, WorkloadPorts};
