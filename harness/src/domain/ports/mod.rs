//! Domain port surface.
//!
//! Each port is an async trait the domain depends on and an outbound adapter
//! implements. Port errors are typed enums with constructor helpers so call
//! sites never format variant payloads by hand.

pub mod directory;
pub mod naming;
pub mod pacing;
pub mod session;

pub use self::directory::{DirectoryError, GroupId, IdentityDirectory, NewUser, UserId};
pub use self::naming::{EntityNamer, TimestampNamer};
pub use self::pacing::{Sleeper, TokioSleeper};
pub use self::session::{AdminSession, SessionError, TokenGrant};

#[cfg(test)]
pub use self::directory::MockIdentityDirectory;
#[cfg(test)]
pub use self::session::MockAdminSession;
