//! Identity directory port: group and user creation.

use async_trait::async_trait;

/// Identifier assigned to a created group by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupId(String);

impl GroupId {
    /// Wrap a provider-assigned group identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Identifier assigned to a created user by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    /// Wrap a provider-assigned user identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Specification for a user creation call.
///
/// Group membership is expressed as full group paths
/// (`/<group>/<subgroup>`), mirroring the provider's admin API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login name for the new account.
    pub username: String,
    /// Whether the account is enabled on creation.
    pub enabled: bool,
    /// Full paths of the groups the user joins on creation.
    pub group_paths: Vec<String>,
}

/// Errors exposed by the directory port.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// The admin API could not be reached or timed out.
    #[error("directory transport failed: {message}")]
    Transport {
        /// Adapter-provided transport detail.
        message: String,
    },
    /// The admin API answered with a non-success status.
    #[error("directory rejected the request (status {status}): {message}")]
    Status {
        /// HTTP status returned by the admin API.
        status: u16,
        /// Response body preview.
        message: String,
    },
    /// The response carried no usable created-entity identifier.
    #[error("directory response could not be decoded: {message}")]
    Decode {
        /// Decoder detail.
        message: String,
    },
}

impl DirectoryError {
    /// Build a [`DirectoryError::Transport`].
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`DirectoryError::Status`].
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Build a [`DirectoryError::Decode`].
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Creation operations against the identity provider's admin API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Create a top-level group and return its identifier.
    async fn create_group(&self, token: &str, name: &str) -> Result<GroupId, DirectoryError>;

    /// Create a child group under `parent` and return its identifier.
    async fn create_child_group(
        &self,
        token: &str,
        parent: &GroupId,
        name: &str,
    ) -> Result<GroupId, DirectoryError>;

    /// Create a user and return its identifier.
    async fn create_user(&self, token: &str, user: &NewUser) -> Result<UserId, DirectoryError>;
}
