//! Admin session port: credential acquisition and refresh.
//!
//! The port hides the wire-level token endpoint. The lease manager only sees
//! token material plus a relative lifetime; converting that lifetime into an
//! absolute expiry is domain business (it needs the injected clock).

use std::time::Duration;

use async_trait::async_trait;

/// Token material returned by a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    /// Bearer token presented on admin API calls.
    pub access_token: String,
    /// Opaque token exchanged for the next grant.
    pub refresh_token: String,
    /// Grant lifetime relative to the moment it was issued.
    pub expires_in: Duration,
}

/// Errors exposed by the session port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The token endpoint could not be reached or timed out.
    #[error("session transport failed: {message}")]
    Transport {
        /// Adapter-provided transport detail.
        message: String,
    },
    /// The identity provider rejected the credentials or the grant.
    #[error("session rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Response body preview.
        message: String,
    },
    /// The token response could not be decoded.
    #[error("token response could not be decoded: {message}")]
    Decode {
        /// Decoder detail.
        message: String,
    },
}

impl SessionError {
    /// Build a [`SessionError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`SessionError::Rejected`].
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Build a [`SessionError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Authentication operations against the identity provider.
///
/// Implementations hold the admin credentials, realm, and client identity as
/// adapter configuration; the domain never sees them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminSession: Send + Sync {
    /// Authenticate with the configured admin credentials.
    async fn login(&self) -> Result<TokenGrant, SessionError>;

    /// Exchange a refresh token for a fresh grant.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, SessionError>;
}
