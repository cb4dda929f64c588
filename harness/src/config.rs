//! Harness configuration loaded via OrthoConfig.
//!
//! Every knob has a production default matching the fixed values the harness
//! was designed around; environment variables (prefix `HARNESS_`) or CLI
//! flags override them. Pacing lives here rather than in the driver so tests
//! inject zero-length pauses.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::WorkloadConfig;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";
const DEFAULT_REALM: &str = "master";
const DEFAULT_CLIENT_ID: &str = "admin-cli";
const DEFAULT_REFRESH_MARGIN_SECONDS: u64 = 300;
const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_SETTLE_PAUSE_MS: u64 = 500;
const DEFAULT_COOLDOWN_SECONDS: u64 = 300;

/// Configuration values controlling the harness run.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HARNESS")]
pub struct HarnessSettings {
    /// Identity provider base URL.
    pub server_url: Option<String>,
    /// Admin account used for the password grant.
    pub admin_username: Option<String>,
    /// Admin account password.
    pub admin_password: Option<String>,
    /// Realm the harness authenticates against and creates entities in.
    pub realm: Option<String>,
    /// OAuth client id presented on token requests.
    pub client_id: Option<String>,
    /// Optional OAuth client secret for refresh requests.
    pub client_secret: Option<String>,
    /// How far ahead of lease expiry a refresh is attempted, in seconds.
    pub refresh_margin_seconds: Option<u64>,
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_seconds: Option<u64>,
    /// Pause between a subgroup creation and its user batch, in milliseconds.
    pub subgroup_settle_pause_ms: Option<u64>,
    /// Pause after each subgroup's user batch, in seconds.
    pub subgroup_cooldown_seconds: Option<u64>,
    /// Stop after this many cycles; run until a fatal error when unset.
    pub max_cycles: Option<u64>,
}

impl HarnessSettings {
    /// Parsed identity provider base URL.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the configured value is not a valid URL.
    pub fn server_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL))
    }

    /// Admin username, falling back to the default.
    #[must_use]
    pub fn admin_username(&self) -> &str {
        self.admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
    }

    /// Admin password, falling back to the default.
    #[must_use]
    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Target realm, falling back to the default.
    #[must_use]
    pub fn realm(&self) -> &str {
        self.realm.as_deref().unwrap_or(DEFAULT_REALM)
    }

    /// OAuth client id, falling back to the admin CLI client.
    #[must_use]
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID)
    }

    /// Refresh margin as a duration.
    #[must_use]
    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(
            self.refresh_margin_seconds
                .unwrap_or(DEFAULT_REFRESH_MARGIN_SECONDS),
        )
    }

    /// HTTP request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }

    /// Workload topology and pacing derived from these settings.
    ///
    /// The 10 x 10 subgroup/user topology is fixed; only pacing is
    /// configurable.
    #[must_use]
    pub fn workload(&self) -> WorkloadConfig {
        WorkloadConfig {
            subgroup_settle_pause: Duration::from_millis(
                self.subgroup_settle_pause_ms
                    .unwrap_or(DEFAULT_SETTLE_PAUSE_MS),
            ),
            subgroup_cooldown: Duration::from_secs(
                self.subgroup_cooldown_seconds
                    .unwrap_or(DEFAULT_COOLDOWN_SECONDS),
            ),
            ..WorkloadConfig::default()
        }
    }
}
