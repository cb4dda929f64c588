//! Workload driver: one full group/subgroup/user creation cycle.
//!
//! The driver owns cycle orchestration only. Entity creation goes through the
//! directory port, pacing through the sleeper port, and credential upkeep
//! through the lease manager; every remote call feeds a latency sample into
//! the shared aggregator.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::error::CycleError;
use super::lease::{CredentialLease, LeaseManager};
use super::metrics::{CreationCounters, MetricsAggregator};
use super::ports::{DirectoryError, EntityNamer, GroupId, IdentityDirectory, NewUser, Sleeper};

/// Status code filed for every counted creation failure.
///
/// The remote cause is deliberately not classified further; the statistics
/// only need one coarse failure bucket.
const GENERIC_FAILURE_STATUS: u16 = 500;

/// Topology and pacing parameters for one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// Subgroups created under each cycle's root group.
    pub subgroups_per_group: u32,
    /// Users created inside each subgroup.
    pub users_per_subgroup: u32,
    /// Pause between a subgroup creation and its user batch.
    pub subgroup_settle_pause: Duration,
    /// Pause after each subgroup's user batch, before the lease re-check.
    pub subgroup_cooldown: Duration,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            subgroups_per_group: 10,
            users_per_subgroup: 10,
            subgroup_settle_pause: Duration::from_millis(500),
            subgroup_cooldown: Duration::from_secs(300),
        }
    }
}

/// Port bundle required by the workload driver.
pub struct WorkloadPorts {
    /// Outbound identity directory adapter.
    pub directory: Arc<dyn IdentityDirectory>,
    /// Naming strategy for created entities.
    pub namer: Arc<dyn EntityNamer>,
    /// Pacing implementation for the fixed pauses.
    pub sleeper: Arc<dyn Sleeper>,
}

/// Drives one creation cycle at a time against the identity provider.
pub struct WorkloadDriver {
    directory: Arc<dyn IdentityDirectory>,
    namer: Arc<dyn EntityNamer>,
    sleeper: Arc<dyn Sleeper>,
    lease_manager: Arc<LeaseManager>,
    metrics: Arc<MetricsAggregator>,
    counters: Arc<CreationCounters>,
    config: WorkloadConfig,
}

impl WorkloadDriver {
    /// Build a driver over the given ports and shared statistics.
    pub fn new(
        ports: WorkloadPorts,
        lease_manager: Arc<LeaseManager>,
        metrics: Arc<MetricsAggregator>,
        counters: Arc<CreationCounters>,
        config: WorkloadConfig,
    ) -> Self {
        Self {
            directory: ports.directory,
            namer: ports.namer,
            sleeper: ports.sleeper,
            lease_manager,
            metrics,
            counters,
            config,
        }
    }

    /// Run one full cycle and return the lease to use for the next one.
    ///
    /// Subgroup and user failures are counted and skipped; the cycle carries
    /// on with the next sibling entity. The returned lease may differ from
    /// the input when a mid-cycle check refreshed it.
    ///
    /// # Errors
    ///
    /// [`CycleError::GroupCreation`] when the root group cannot be created
    /// (the cycle is abandoned before any child work), and
    /// [`CycleError::Auth`] when a mid-cycle lease check exhausts both
    /// recovery paths.
    pub async fn run_cycle(&self, lease: CredentialLease) -> Result<CredentialLease, CycleError> {
        let group_name = self.namer.group_name();
        let created = self
            .timed(self.directory.create_group(lease.access_token(), &group_name))
            .await;
        let group_id = created.map_err(CycleError::GroupCreation)?;
        info!(group = %group_name, id = %group_id, "created group");
        self.counters.record_group();

        let mut lease = lease;
        for subgroup_idx in 1..=self.config.subgroups_per_group {
            lease = self
                .run_subgroup(lease, &group_id, &group_name, subgroup_idx)
                .await?;
        }
        Ok(lease)
    }

    /// Create one subgroup and its user batch, then re-check the lease.
    ///
    /// The user batch plus cooldown can span minutes, so the lease check
    /// after it keeps the next subgroup from starting with a stale token.
    async fn run_subgroup(
        &self,
        lease: CredentialLease,
        group_id: &GroupId,
        group_name: &str,
        subgroup_idx: u32,
    ) -> Result<CredentialLease, CycleError> {
        let subgroup_name = format!("{group_name}-subgroup-{subgroup_idx}");
        let created = self
            .timed(self.directory.create_child_group(
                lease.access_token(),
                group_id,
                &subgroup_name,
            ))
            .await;
        match created {
            Ok(subgroup_id) => {
                info!(subgroup = %subgroup_name, id = %subgroup_id, "created subgroup");
            }
            Err(error) => {
                warn!(subgroup = %subgroup_name, error = %error, "subgroup creation failed");
                self.metrics.record_error(GENERIC_FAILURE_STATUS);
                return Ok(lease);
            }
        }

        self.sleeper.sleep(self.config.subgroup_settle_pause).await;
        self.create_users(&lease, group_name, &subgroup_name).await;
        self.sleeper.sleep(self.config.subgroup_cooldown).await;

        self.lease_manager
            .ensure_valid(lease)
            .await
            .map_err(CycleError::Auth)
    }

    async fn create_users(&self, lease: &CredentialLease, group_name: &str, subgroup_name: &str) {
        let group_path = format!("/{group_name}/{subgroup_name}");
        for user_idx in 1..=self.config.users_per_subgroup {
            let user = NewUser {
                username: self.namer.username(user_idx),
                enabled: true,
                group_paths: vec![group_path.clone()],
            };
            let created = self
                .timed(self.directory.create_user(lease.access_token(), &user))
                .await;
            match created {
                Ok(user_id) => {
                    info!(username = %user.username, id = %user_id, "created user");
                    self.counters.record_user();
                }
                Err(error) => {
                    warn!(username = %user.username, error = %error, "user creation failed");
                    self.metrics.record_error(GENERIC_FAILURE_STATUS);
                }
            }
        }
    }

    /// Await `call` and record its round trip, whatever the outcome.
    async fn timed<T>(
        &self,
        call: impl Future<Output = Result<T, DirectoryError>>,
    ) -> Result<T, DirectoryError> {
        let started = Instant::now();
        let outcome = call.await;
        self.metrics.record_latency(started.elapsed());
        outcome
    }
}

#[cfg(test)]
mod tests;
