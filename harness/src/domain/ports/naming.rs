//! Entity naming strategy.
//!
//! Generated names only need to be unique enough for a load run; the
//! timestamp strategy collides when a cycle or user batch outpaces one call
//! per second, and the remote API surfaces that as an ordinary creation
//! failure. Tests inject a monotonic implementation instead of wall-clock
//! time.

use std::sync::Arc;

use mockable::Clock;

/// Names for the entities created during one cycle.
pub trait EntityNamer: Send + Sync {
    /// Name for a cycle's root group.
    fn group_name(&self) -> String;

    /// Username for the user at `user_idx` within the current subgroup batch.
    fn username(&self, user_idx: u32) -> String;
}

/// Production namer deriving names from the current Unix timestamp.
pub struct TimestampNamer {
    clock: Arc<dyn Clock>,
}

impl TimestampNamer {
    /// Build a namer reading from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl EntityNamer for TimestampNamer {
    fn group_name(&self) -> String {
        format!("Group-{}", self.clock.utc().timestamp())
    }

    fn username(&self, user_idx: u32) -> String {
        format!("User-{}-{}", self.clock.utc().timestamp(), user_idx)
    }
}
