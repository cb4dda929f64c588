//! Outer harness loop.
//!
//! Wires the lease manager, workload driver, and reporter together: acquire a
//! lease, then repeat ensure-valid / run-cycle / report until a fatal
//! authentication failure or the optional cycle budget ends the run.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{
    CreationCounters, CycleError, FatalError, LeaseManager, MetricsAggregator, WorkloadDriver,
    composite_snapshot, reporter,
};

/// The harness loop and its shared statistics.
pub struct Runner {
    lease_manager: Arc<LeaseManager>,
    driver: WorkloadDriver,
    metrics: Arc<MetricsAggregator>,
    counters: Arc<CreationCounters>,
    max_cycles: Option<u64>,
}

impl Runner {
    /// Build a runner; `max_cycles` of `None` loops until a fatal error.
    pub fn new(
        lease_manager: Arc<LeaseManager>,
        driver: WorkloadDriver,
        metrics: Arc<MetricsAggregator>,
        counters: Arc<CreationCounters>,
        max_cycles: Option<u64>,
    ) -> Self {
        Self {
            lease_manager,
            driver,
            metrics,
            counters,
            max_cycles,
        }
    }

    /// Run the harness loop.
    ///
    /// Cycle-aborting errors are logged and the loop moves on; every cycle
    /// ends with one metrics report either way.
    ///
    /// # Errors
    ///
    /// [`FatalError`] when the initial login fails or a lease check exhausts
    /// both recovery paths; no further work is possible without credentials.
    pub async fn run(&self) -> Result<(), FatalError> {
        let mut lease = self
            .lease_manager
            .acquire()
            .await
            .map_err(FatalError::InitialLogin)?;

        let mut completed: u64 = 0;
        loop {
            lease = self.lease_manager.ensure_valid(lease).await?;

            // A cycle abort can only happen before any mid-cycle refresh, so
            // the lease held here is still the one to carry forward.
            match self.driver.run_cycle(lease.clone()).await {
                Ok(next_lease) => lease = next_lease,
                Err(CycleError::GroupCreation(error)) => {
                    warn!(error = %error, "cycle aborted");
                }
                Err(CycleError::Auth(error)) => return Err(error.into()),
            }

            reporter::emit(&composite_snapshot(&self.metrics, &self.counters));

            completed += 1;
            if self.max_cycles.is_some_and(|limit| completed >= limit) {
                info!(cycles = completed, "cycle budget reached, stopping");
                return Ok(());
            }
        }
    }
}
