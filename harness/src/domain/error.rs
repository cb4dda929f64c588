//! Harness error taxonomy.
//!
//! Three tiers: fatal errors end the process, cycle errors end the current
//! cycle, and everything else is absorbed inside the workload driver as a
//! counted metric. Only the first two tiers appear as types here.

use super::ports::{DirectoryError, SessionError};

/// Both recovery paths for an expiring lease failed.
///
/// Carries the refresh failure and the subsequent login failure so the final
/// log line explains the full story.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("re-authentication failed (refresh: {refresh}; login: {login})")]
pub struct FatalAuthError {
    /// Error from the refresh attempt.
    pub refresh: SessionError,
    /// Error from the fallback login attempt.
    pub login: SessionError,
}

/// Errors that stop the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CycleError {
    /// Root group creation failed; the cycle is abandoned and the outer loop
    /// moves on to the next one.
    #[error("group creation failed: {0}")]
    GroupCreation(DirectoryError),
    /// A mid-cycle lease check exhausted both recovery paths.
    #[error(transparent)]
    Auth(FatalAuthError),
}

/// Errors that end the harness process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    /// The very first authentication failed; no work can start.
    #[error("initial authentication failed: {0}")]
    InitialLogin(SessionError),
    /// A lease check exhausted both recovery paths mid-run.
    #[error(transparent)]
    Reauthentication(#[from] FatalAuthError),
}
