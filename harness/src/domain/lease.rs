//! Credential lease lifecycle.
//!
//! A lease is the currently held access/refresh token pair plus the absolute
//! expiry of the access token. Leases are replaced wholesale on refresh or
//! re-authentication, never partially updated, so `expires_at` always
//! describes the access token actually held.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{info, warn};

use super::error::FatalAuthError;
use super::ports::{AdminSession, SessionError, TokenGrant};

/// The admin token pair currently held by the harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialLease {
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl CredentialLease {
    /// Build a lease from a grant issued at `now`.
    #[must_use]
    pub fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Self {
        let lifetime = TimeDelta::from_std(grant.expires_in).unwrap_or(TimeDelta::MAX);
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: now.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// Bearer token presented on admin API calls.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.as_str()
    }

    /// Absolute expiry of the held access token.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Keeps the credential lease valid ahead of its expiry.
pub struct LeaseManager {
    session: Arc<dyn AdminSession>,
    clock: Arc<dyn Clock>,
    refresh_margin: TimeDelta,
}

impl LeaseManager {
    /// Build a manager refreshing `refresh_margin` ahead of lease expiry.
    pub fn new(session: Arc<dyn AdminSession>, clock: Arc<dyn Clock>, refresh_margin: Duration) -> Self {
        Self {
            session,
            clock,
            refresh_margin: TimeDelta::from_std(refresh_margin).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Perform the initial login and mint the first lease.
    ///
    /// # Errors
    ///
    /// Returns the session error when the login fails; the caller treats this
    /// as fatal since no work can proceed without a lease.
    pub async fn acquire(&self) -> Result<CredentialLease, SessionError> {
        let grant = self.session.login().await?;
        let lease = CredentialLease::from_grant(grant, self.clock.utc());
        info!(expires_at = %lease.expires_at(), "admin session established");
        Ok(lease)
    }

    /// Return a lease guaranteed to stay valid past the refresh margin.
    ///
    /// A fresh lease is returned unchanged without any network call. An
    /// expiring lease is refreshed; when the refresh is rejected the manager
    /// falls back to a full login.
    ///
    /// # Errors
    ///
    /// [`FatalAuthError`] when the refresh and the fallback login both fail.
    pub async fn ensure_valid(&self, lease: CredentialLease) -> Result<CredentialLease, FatalAuthError> {
        let now = self.clock.utc();
        let refresh_threshold = lease.expires_at().checked_sub_signed(self.refresh_margin);
        if refresh_threshold.is_some_and(|threshold| now < threshold) {
            return Ok(lease);
        }

        match self.session.refresh(&lease.refresh_token).await {
            Ok(grant) => {
                info!("admin token refreshed");
                Ok(CredentialLease::from_grant(grant, self.clock.utc()))
            }
            Err(refresh_error) => {
                warn!(error = %refresh_error, "token refresh failed, re-authenticating");
                match self.session.login().await {
                    Ok(grant) => {
                        info!("admin session re-established");
                        Ok(CredentialLease::from_grant(grant, self.clock.utc()))
                    }
                    Err(login_error) => Err(FatalAuthError {
                        refresh: refresh_error,
                        login: login_error,
                    }),
                }
            }
        }
    }
}
