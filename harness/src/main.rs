//! Harness entrypoint: wires configuration, the Keycloak adapter, and the
//! cycle loop together.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use mockable::DefaultClock;
use ortho_config::OrthoConfig as _;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use harness::config::HarnessSettings;
use harness::domain::ports::{TimestampNamer, TokioSleeper};
use harness::domain::{
    CreationCounters, LeaseManager, MetricsAggregator, WorkloadDriver, WorkloadPorts,
};
use harness::outbound::keycloak::{KeycloakAdminGateway, KeycloakGatewayConfig};
use harness::runner::Runner;

fn main() -> io::Result<()> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = HarnessSettings::load_from_iter(env::args_os()).map_err(io::Error::other)?;
    let base_url = settings
        .server_url()
        .map_err(|error| io::Error::other(format!("invalid server URL: {error}")))?;

    let gateway = Arc::new(
        KeycloakAdminGateway::new(KeycloakGatewayConfig {
            base_url,
            realm: settings.realm().to_owned(),
            admin_username: settings.admin_username().to_owned(),
            admin_password: settings.admin_password().to_owned(),
            client_id: settings.client_id().to_owned(),
            client_secret: settings.client_secret.clone(),
            request_timeout: settings.request_timeout(),
        })
        .map_err(|error| io::Error::other(format!("build Keycloak gateway: {error}")))?,
    );

    let clock = Arc::new(DefaultClock);
    let metrics = Arc::new(MetricsAggregator::new());
    let counters = Arc::new(CreationCounters::new());
    let lease_manager = Arc::new(LeaseManager::new(
        gateway.clone(),
        clock.clone(),
        settings.refresh_margin(),
    ));
    let driver = WorkloadDriver::new(
        WorkloadPorts {
            directory: gateway,
            namer: Arc::new(TimestampNamer::new(clock)),
            sleeper: Arc::new(TokioSleeper),
        },
        lease_manager.clone(),
        metrics.clone(),
        counters.clone(),
        settings.workload(),
    );

    Runner::new(lease_manager, driver, metrics, counters, settings.max_cycles)
        .run()
        .await
        .map_err(|error| io::Error::other(format!("fatal: {error}")))
}
