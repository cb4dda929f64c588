//! Behaviour tests for the workload driver.
//!
//! The directory stub scripts failures by call number; pacing is observed
//! through a recording sleeper and credential upkeep through a mocked
//! session port.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

use super::{WorkloadConfig, WorkloadDriver, WorkloadPorts};
use crate::domain::error::CycleError;
use crate::domain::lease::{CredentialLease, LeaseManager};
use crate::domain::metrics::{CreationCounters, MetricsAggregator};
use crate::domain::ports::{
    DirectoryError, GroupId, IdentityDirectory, MockAdminSession, NewUser, SessionError,
    TokenGrant, UserId,
};
use crate::test_support::{MutableClock, RecordingSleeper, SequenceNamer};

const SETTLE: Duration = Duration::from_millis(500);
const COOLDOWN: Duration = Duration::from_secs(300);
const MARGIN: Duration = Duration::from_secs(300);

#[derive(Default)]
struct DirectoryStub {
    fail_group: bool,
    failing_subgroups: Vec<usize>,
    failing_users: Vec<usize>,
    group_calls: AtomicUsize,
    subgroup_names: Mutex<Vec<String>>,
    users: Mutex<Vec<NewUser>>,
}

impl DirectoryStub {
    fn subgroup_names(&self) -> Vec<String> {
        self.subgroup_names.lock().expect("names mutex").clone()
    }

    fn users(&self) -> Vec<NewUser> {
        self.users.lock().expect("users mutex").clone()
    }
}

#[async_trait]
impl IdentityDirectory for DirectoryStub {
    async fn create_group(&self, _token: &str, name: &str) -> Result<GroupId, DirectoryError> {
        self.group_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_group {
            return Err(DirectoryError::status(503, "temporarily overloaded"));
        }
        Ok(GroupId::new(format!("{name}-id")))
    }

    async fn create_child_group(
        &self,
        _token: &str,
        _parent: &GroupId,
        name: &str,
    ) -> Result<GroupId, DirectoryError> {
        let call = {
            let mut names = self.subgroup_names.lock().expect("names mutex");
            names.push(name.to_owned());
            names.len()
        };
        if self.failing_subgroups.contains(&call) {
            return Err(DirectoryError::status(409, "conflicting subgroup"));
        }
        Ok(GroupId::new(format!("{name}-id")))
    }

    async fn create_user(&self, _token: &str, user: &NewUser) -> Result<UserId, DirectoryError> {
        let call = {
            let mut users = self.users.lock().expect("users mutex");
            users.push(user.clone());
            users.len()
        };
        if self.failing_users.contains(&call) {
            return Err(DirectoryError::status(409, "username exists"));
        }
        Ok(UserId::new(format!("{}-id", user.username)))
    }
}

struct Fixture {
    driver: WorkloadDriver,
    metrics: Arc<MetricsAggregator>,
    counters: Arc<CreationCounters>,
    sleeper: Arc<RecordingSleeper>,
    directory: Arc<DirectoryStub>,
    lease: CredentialLease,
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid time")
}

fn fresh_session() -> MockAdminSession {
    let mut session = MockAdminSession::new();
    session.expect_refresh().times(0);
    session.expect_login().times(0);
    session
}

fn grant(tag: &str, expires_in: Duration) -> TokenGrant {
    TokenGrant {
        access_token: format!("access-{tag}"),
        refresh_token: format!("refresh-{tag}"),
        expires_in,
    }
}

fn fixture(directory: DirectoryStub, session: MockAdminSession, lease_lifetime: Duration) -> Fixture {
    let now = start();
    let metrics = Arc::new(MetricsAggregator::new());
    let counters = Arc::new(CreationCounters::new());
    let sleeper = Arc::new(RecordingSleeper::default());
    let directory = Arc::new(directory);
    let directory_port: Arc<dyn IdentityDirectory> = directory.clone();
    let lease_manager = Arc::new(LeaseManager::new(
        Arc::new(session),
        Arc::new(MutableClock::new(now)),
        MARGIN,
    ));
    let lease = CredentialLease::from_grant(grant("held", lease_lifetime), now);
    let driver = WorkloadDriver::new(
        WorkloadPorts {
            directory: directory_port,
            namer: Arc::new(SequenceNamer::default()),
            sleeper: sleeper.clone(),
        },
        lease_manager,
        metrics.clone(),
        counters.clone(),
        WorkloadConfig {
            subgroups_per_group: 10,
            users_per_subgroup: 10,
            subgroup_settle_pause: SETTLE,
            subgroup_cooldown: COOLDOWN,
        },
    );
    Fixture {
        driver,
        metrics,
        counters,
        sleeper,
        directory,
        lease,
    }
}

fn sleep_pattern(successful_subgroups: usize) -> Vec<Duration> {
    (0..successful_subgroups)
        .flat_map(|_| [SETTLE, COOLDOWN])
        .collect()
}

#[rstest]
#[tokio::test]
async fn full_cycle_creates_one_group_and_one_hundred_users() {
    let fx = fixture(
        DirectoryStub::default(),
        fresh_session(),
        Duration::from_secs(3600),
    );

    let lease = fx.driver.run_cycle(fx.lease.clone()).await.expect("cycle succeeds");
    assert_eq!(lease, fx.lease, "a fresh lease passes through unchanged");

    let counters = fx.counters.snapshot();
    assert_eq!(counters.total_groups_created, 1);
    assert_eq!(counters.total_users_created, 100);

    let metrics = fx.metrics.snapshot();
    assert_eq!(metrics.total_requests, 111, "1 group + 10 subgroups + 100 users");
    assert_eq!(metrics.total_errors, 0);
    assert!(metrics.error_counts.is_empty());

    assert_eq!(fx.sleeper.recorded(), sleep_pattern(10));
}

#[rstest]
#[tokio::test]
async fn group_failure_aborts_the_cycle_before_any_child_work() {
    let fx = fixture(
        DirectoryStub {
            fail_group: true,
            ..DirectoryStub::default()
        },
        fresh_session(),
        Duration::from_secs(3600),
    );

    let error = fx
        .driver
        .run_cycle(fx.lease.clone())
        .await
        .expect_err("cycle aborts");
    assert!(matches!(error, CycleError::GroupCreation(_)));

    assert!(fx.directory.subgroup_names().is_empty());
    assert!(fx.directory.users().is_empty());
    assert!(fx.sleeper.recorded().is_empty());

    let counters = fx.counters.snapshot();
    assert_eq!(counters.total_groups_created, 0);
    assert_eq!(counters.total_users_created, 0);

    // The failed call still measured a round trip, but group-level failures
    // are only logged, never metered as errors.
    let metrics = fx.metrics.snapshot();
    assert_eq!(metrics.total_requests, 1);
    assert_eq!(metrics.total_errors, 0);
    assert!(metrics.error_counts.is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_subgroup_contributes_no_users_and_one_counted_error() {
    let fx = fixture(
        DirectoryStub {
            failing_subgroups: vec![3],
            ..DirectoryStub::default()
        },
        fresh_session(),
        Duration::from_secs(3600),
    );

    fx.driver.run_cycle(fx.lease.clone()).await.expect("cycle tolerates the failure");

    let counters = fx.counters.snapshot();
    assert_eq!(counters.total_groups_created, 1);
    assert_eq!(counters.total_users_created, 90);

    let metrics = fx.metrics.snapshot();
    assert_eq!(metrics.total_requests, 101, "1 group + 10 subgroups + 90 users");
    assert_eq!(metrics.total_errors, 1);
    assert_eq!(metrics.error_counts.get(&500), Some(&1));

    // The failed subgroup skips its settle pause, user batch, and cooldown.
    assert_eq!(fx.sleeper.recorded(), sleep_pattern(9));
}

#[rstest]
#[tokio::test]
async fn user_failures_are_counted_and_skipped_individually() {
    let fx = fixture(
        DirectoryStub {
            failing_users: vec![5, 17],
            ..DirectoryStub::default()
        },
        fresh_session(),
        Duration::from_secs(3600),
    );

    fx.driver.run_cycle(fx.lease.clone()).await.expect("cycle tolerates user failures");

    let counters = fx.counters.snapshot();
    assert_eq!(counters.total_users_created, 98);

    let metrics = fx.metrics.snapshot();
    assert_eq!(metrics.total_requests, 111, "failed user calls still sample latency");
    assert_eq!(metrics.error_counts.get(&500), Some(&2));
}

#[rstest]
#[tokio::test]
async fn users_join_their_subgroup_by_full_path() {
    let fx = fixture(
        DirectoryStub::default(),
        fresh_session(),
        Duration::from_secs(3600),
    );

    fx.driver.run_cycle(fx.lease.clone()).await.expect("cycle succeeds");

    let users = fx.directory.users();
    let first = users.first().expect("at least one user");
    assert!(first.enabled);
    assert_eq!(
        first.group_paths,
        vec!["/group-0/group-0-subgroup-1".to_owned()]
    );
    let last = users.last().expect("a hundred users");
    assert_eq!(
        last.group_paths,
        vec!["/group-0/group-0-subgroup-10".to_owned()]
    );
}

#[rstest]
#[tokio::test]
async fn expiring_lease_is_rechecked_after_every_subgroup() {
    let mut session = MockAdminSession::new();
    // A zero-lifetime grant keeps every check inside the refresh margin, so
    // each of the ten subgroups triggers exactly one refresh.
    session
        .expect_refresh()
        .times(10)
        .returning(|_| Ok(grant("fresh", Duration::ZERO)));
    session.expect_login().times(0);
    let fx = fixture(DirectoryStub::default(), session, Duration::ZERO);

    let lease = fx.driver.run_cycle(fx.lease.clone()).await.expect("cycle succeeds");
    assert_eq!(lease.access_token(), "access-fresh");
}

#[rstest]
#[tokio::test]
async fn mid_cycle_double_auth_failure_stops_the_cycle() {
    let mut session = MockAdminSession::new();
    session
        .expect_refresh()
        .times(1)
        .returning(|_| Err(SessionError::transport("connection reset")));
    session
        .expect_login()
        .times(1)
        .returning(|| Err(SessionError::rejected(401, "invalid credentials")));
    let fx = fixture(DirectoryStub::default(), session, Duration::ZERO);

    let error = fx
        .driver
        .run_cycle(fx.lease.clone())
        .await
        .expect_err("fatal auth failure");
    assert!(matches!(error, CycleError::Auth(_)));

    // The first subgroup and its users completed before the failed check.
    assert_eq!(fx.directory.subgroup_names().len(), 1);
    assert_eq!(fx.directory.users().len(), 10);
    assert_eq!(fx.sleeper.recorded(), sleep_pattern(1));
}
