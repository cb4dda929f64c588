//! Pacing abstraction for the workload driver's fixed pauses.

use std::time::Duration;

use async_trait::async_trait;

/// Clock-independent sleeping abstraction.
///
/// The driver's settle and cooldown pauses go through this trait so tests can
/// substitute a recording or zero-length implementation.
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend execution for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
