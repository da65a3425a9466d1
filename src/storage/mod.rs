//! Token persistence.
//!
//! The session token is the only value that survives a restart. It lives
//! under a single fixed key in a durable key/value store; absence of the key
//! is a normal `Ok(None)`, never an error.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::Result;

/// Key under which the session token is stored.
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Durable, synchronous storage for the session token.
///
/// Writes are unconditional overwrites. Implementations report I/O trouble
/// as [`SessionError::StorageUnavailable`](crate::SessionError::StorageUnavailable);
/// callers decide how to degrade.
pub trait TokenStorage: Send + Sync {
    /// Store `token`, replacing any previous value.
    fn save(&self, token: &str) -> Result<()>;

    /// Read the stored token, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<()>;
}
